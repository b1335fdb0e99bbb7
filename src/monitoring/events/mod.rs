/*!
 * Event System
 * Strongly-typed observability events
 */

use crate::core::types::{Timestamp, WorkerId};
use crate::process::Phase;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Event severity for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Severity {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

/// Unified event type - all observability events flow through this
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Monotonic timestamp (nanoseconds since the first event)
    pub timestamp_ns: Timestamp,
    /// Event severity
    pub severity: Severity,
    /// Worker the event is about, if any
    pub worker: Option<WorkerId>,
    /// Event payload
    pub payload: Payload,
}

/// Event payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    // Worker lifecycle
    WorkerStarted,
    PhaseEntered { phase: Phase },
    WorkerFailed { error: String },
    WorkerExited { cycles: u64 },

    // Rendezvous
    BarrierReleased { generation: u64 },

    // Inbox
    MessageSent { message: String },
    MessageReceived { message: String },

    // Coordinator
    StopRequested,
    ShutdownComplete { drained: usize },
}

impl Event {
    /// Create a new event with current timestamp
    #[inline]
    pub fn new(severity: Severity, payload: Payload) -> Self {
        Self {
            timestamp_ns: Self::now_ns(),
            severity,
            worker: None,
            payload,
        }
    }

    /// Attach the worker the event is about
    #[inline]
    pub fn with_worker(mut self, worker: WorkerId) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Phase transition of `worker`
    #[inline]
    pub fn phase(worker: &WorkerId, phase: Phase) -> Self {
        Self::new(Severity::Debug, Payload::PhaseEntered { phase }).with_worker(worker.clone())
    }

    /// The phase entered, for `PhaseEntered` events
    #[inline]
    pub fn entered_phase(&self) -> Option<Phase> {
        match self.payload {
            Payload::PhaseEntered { phase } => Some(phase),
            _ => None,
        }
    }

    /// Get current time in nanoseconds (monotonic)
    #[inline]
    fn now_ns() -> Timestamp {
        static START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
        let start = START.get_or_init(Instant::now);
        start.elapsed().as_nanos() as u64
    }

    /// Get event age
    #[inline]
    pub fn age(&self) -> Duration {
        Duration::from_nanos(Self::now_ns().saturating_sub(self.timestamp_ns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_event() {
        let worker = WorkerId::with_prefix("W", 1);
        let event = Event::phase(&worker, Phase::AtBarrier);

        assert_eq!(event.severity, Severity::Debug);
        assert_eq!(event.worker, Some(worker));
        assert_eq!(event.entered_phase(), Some(Phase::AtBarrier));
    }

    #[test]
    fn test_timestamps_monotonic() {
        let first = Event::new(Severity::Info, Payload::StopRequested);
        let second = Event::new(Severity::Info, Payload::StopRequested);
        assert!(second.timestamp_ns >= first.timestamp_ns);
    }

    #[test]
    fn test_event_json_shape() {
        let event = Event::new(
            Severity::Info,
            Payload::MessageSent {
                message: "W1 collected a treasure!".into(),
            },
        );
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["severity"], "info");
        assert_eq!(value["payload"]["kind"], "message_sent");
        assert_eq!(value["payload"]["message"], "W1 collected a treasure!");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warn);
        assert!(Severity::Warn > Severity::Info);
        assert!(Severity::Debug > Severity::Trace);
    }
}
