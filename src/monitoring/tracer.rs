/*!
 * Structured Tracing
 * Subscriber setup and the narration observer used by the binary
 *
 * Environment variables:
 * - RUST_LOG: log filter (default: info)
 * - ADVENTURE_TRACE_JSON: JSON output when "1" or "true"
 */

use super::collection::Observer;
use super::events::{Event, Payload};
use crate::process::Phase;
use tracing::{debug, error, info, info_span, trace, warn, Span};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Initialize structured tracing
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("ADVENTURE_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_names(true)
                    .compact(),
            )
            .try_init()
    };

    if result.is_ok() {
        debug!(json = use_json, "structured tracing initialized");
    }
}

/// Root span for one party run, tagged with a fresh run id
pub fn span_party(worker_count: usize) -> (Span, Uuid) {
    let run_id = Uuid::new_v4();
    let span = info_span!("party", run_id = %run_id, workers = worker_count);
    (span, run_id)
}

/// Turns core events into human-readable log records
///
/// This is the only place narration text lives.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TracingObserver {
    fn narrate_phase(worker: &str, phase: Phase) {
        match phase {
            Phase::Preparing => info!(worker, "{worker} is preparing for the adventure"),
            Phase::AtBarrier => info!(worker, "{worker} is waiting at the barrier"),
            Phase::AwaitingResource => info!(worker, "{worker} is trying to acquire the semaphore"),
            Phase::InCriticalSection => info!(worker, "{worker} is collecting treasure"),
            Phase::Publishing => info!(worker, "{worker} finished the adventure"),
            Phase::Idle => info!(worker, "{worker} is waiting to start a new adventure"),
        }
    }
}

impl Observer for TracingObserver {
    fn observe(&self, event: &Event) {
        let worker = event
            .worker
            .as_ref()
            .map(|w| w.name.as_str())
            .unwrap_or("-");

        match &event.payload {
            Payload::PhaseEntered { phase } => Self::narrate_phase(worker, *phase),
            Payload::WorkerStarted => debug!(worker, "worker started"),
            Payload::BarrierReleased { generation } => {
                info!(generation, "barrier released, every character is ready")
            }
            Payload::MessageSent { message } => info!(worker, message = %message, "message sent"),
            Payload::MessageReceived { message } => {
                trace!(worker, message = %message, "message received")
            }
            Payload::WorkerFailed { error: err } => {
                error!(worker, error = %err, "worker failed")
            }
            Payload::WorkerExited { cycles } => info!(worker, cycles, "worker exited"),
            Payload::StopRequested => warn!("stop requested, finishing current adventures"),
            Payload::ShutdownComplete { drained } => {
                info!(drained, "all adventures are complete")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::WorkerId;
    use crate::monitoring::events::Severity;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    fn init_test_tracing() {
        let _ = tracing_subscriber::registry()
            .with(EnvFilter::new("trace"))
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init();
    }

    #[test]
    fn test_tracing_observer_handles_every_payload() {
        init_test_tracing();

        let worker = WorkerId::with_prefix("W", 1);
        let observer = TracingObserver;
        for phase in Phase::ALL {
            observer.observe(&Event::phase(&worker, phase));
        }
        observer.observe(&Event::new(
            Severity::Error,
            Payload::WorkerFailed {
                error: "boom".into(),
            },
        ));
        observer.observe(&Event::new(Severity::Info, Payload::ShutdownComplete { drained: 4 }));
    }

    #[test]
    fn test_span_party_ids_are_unique() {
        let (_, first) = span_party(4);
        let (_, second) = span_party(4);
        assert_ne!(first, second);
    }
}
