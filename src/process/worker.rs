/*!
 * Worker State Machine
 *
 * Each worker repeats one cycle until it sees the stop flag:
 *
 * ```text
 * Preparing -> AtBarrier -> AwaitingResource -> InCriticalSection -> Publishing -> Idle
 *     ^                                                                           |
 *     +------------------------------- stop flag clear --------------------------+
 * ```
 *
 * The stop flag is only read after `Idle`, so a cycle that has started always
 * runs to completion. The permit and the treasure lock are scoped guards:
 * they are released on every exit path, including a failing work step and a
 * panic. A worker that ends for any reason leaves the barrier so peers that
 * already started another cycle can still pass it.
 */

use super::config::{DelayRange, PhaseTimings};
use super::delay::DelayProvider;
use super::stop::StopFlag;
use super::types::{Phase, WorkerOutcome, WorkerReport};
use super::work::CriticalWork;
use crate::core::errors::{SyncResult, WorkError};
use crate::core::sync::{CountingSemaphore, CyclicBarrier, Lock};
use crate::core::types::WorkerId;
use crate::ipc::{BlockingQueue, QueueMessage};
use crate::monitoring::{Event, Observer, Payload, Severity};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

/// The four primitives every worker shares
#[derive(Debug)]
pub struct SharedResources {
    /// Rendezvous for every worker, once per cycle
    pub barrier: CyclicBarrier,
    /// Limits how many workers queue for the treasure at once
    pub pool: CountingSemaphore,
    /// Guards treasure collection
    pub treasure: Lock,
    /// Results published by workers
    pub inbox: BlockingQueue<QueueMessage>,
}

impl SharedResources {
    pub fn new(
        worker_count: usize,
        pool_capacity: usize,
        observer: Arc<dyn Observer>,
    ) -> SyncResult<Self> {
        Ok(Self {
            barrier: CyclicBarrier::new(worker_count)?,
            pool: CountingSemaphore::new(pool_capacity),
            treasure: Lock::new(),
            inbox: BlockingQueue::new().with_observer(observer),
        })
    }
}

/// One character of the party
pub struct Worker {
    id: WorkerId,
    shared: Arc<SharedResources>,
    stop: StopFlag,
    timings: PhaseTimings,
    delay: Arc<dyn DelayProvider>,
    work: Arc<dyn CriticalWork>,
    observer: Arc<dyn Observer>,
    cycles: AtomicU64,
}

/// Leaves the barrier when the worker ends, however it ends
struct Departure<'a>(&'a CyclicBarrier);

impl Drop for Departure<'_> {
    fn drop(&mut self) {
        self.0.leave();
    }
}

impl Worker {
    pub fn new(
        id: WorkerId,
        shared: Arc<SharedResources>,
        stop: StopFlag,
        timings: PhaseTimings,
        delay: Arc<dyn DelayProvider>,
        work: Arc<dyn CriticalWork>,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self {
            id,
            shared,
            stop,
            timings,
            delay,
            work,
            observer,
            cycles: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> &WorkerId {
        &self.id
    }

    /// Cycles completed so far
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Acquire)
    }

    /// Run cycles until the stop flag is seen or the work step fails
    ///
    /// Never panics. A panic from the work step or from the observer ends
    /// the worker with [`WorkerOutcome::Panicked`]; the barrier departure
    /// happens either way, before the exit is announced.
    pub fn run(&self) -> WorkerReport {
        let outcome = {
            let _departure = Departure(&self.shared.barrier);
            let started = panic::catch_unwind(AssertUnwindSafe(|| {
                self.emit(Severity::Info, Payload::WorkerStarted);
                debug!(worker = %self.id, "worker started");
                self.adventure()
            }));
            match started {
                Ok(outcome) => outcome,
                Err(panic) => WorkerOutcome::Panicked(panic_message(panic.as_ref())),
            }
        };

        let cycles = self.cycles();
        let announced = panic::catch_unwind(AssertUnwindSafe(|| {
            self.announce_exit(&outcome, cycles)
        }));
        if let Err(panic) = announced {
            warn!(
                worker = %self.id,
                panic = %panic_message(panic.as_ref()),
                "observer panicked while reporting exit"
            );
        }

        WorkerReport {
            worker: self.id.clone(),
            cycles,
            outcome,
        }
    }

    fn announce_exit(&self, outcome: &WorkerOutcome, cycles: u64) {
        match outcome {
            WorkerOutcome::Stopped => {}
            WorkerOutcome::Failed(error) | WorkerOutcome::Panicked(error) => {
                warn!(worker = %self.id, error = %error, cycles, "worker terminated early");
                self.emit(
                    Severity::Error,
                    Payload::WorkerFailed {
                        error: error.clone(),
                    },
                );
            }
        }
        self.emit(Severity::Info, Payload::WorkerExited { cycles });
        debug!(worker = %self.id, cycles, "worker exited");
    }

    /// Cycle loop
    ///
    /// The stop flag is checked after `Idle`, not before `Preparing`, so a
    /// worker always completes at least one full cycle, even when the stop
    /// was requested before it started.
    fn adventure(&self) -> WorkerOutcome {
        loop {
            let cycle = self.cycles() + 1;
            if let Err(error) = self.run_cycle(cycle) {
                return WorkerOutcome::Failed(error.to_string());
            }
            self.cycles.store(cycle, Ordering::Release);

            self.enter(Phase::Idle);
            self.pause(self.timings.idle);
            if self.stop.is_raised() {
                return WorkerOutcome::Stopped;
            }
        }
    }

    /// Preparing through Publishing
    fn run_cycle(&self, cycle: u64) -> Result<(), WorkError> {
        self.enter(Phase::Preparing);
        self.pause(self.timings.prepare);

        self.enter(Phase::AtBarrier);
        let rendezvous = self.shared.barrier.wait()?;
        if rendezvous.is_leader {
            self.emit(
                Severity::Info,
                Payload::BarrierReleased {
                    generation: rendezvous.generation,
                },
            );
        }

        self.enter(Phase::AwaitingResource);
        let permit = self.shared.pool.acquire();

        self.enter(Phase::InCriticalSection);
        {
            let _treasure = self.shared.treasure.acquire();
            self.pause(self.timings.collect);
            let body = self.work.perform(&self.id, cycle)?;
            self.shared
                .inbox
                .send(QueueMessage::new(self.id.clone(), cycle, body));
        }

        self.enter(Phase::Publishing);
        drop(permit);
        Ok(())
    }

    fn enter(&self, phase: Phase) {
        self.observer.observe(&Event::phase(&self.id, phase));
    }

    fn pause(&self, range: DelayRange) {
        let duration = self.delay.random_delay(range.min, range.max);
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }

    fn emit(&self, severity: Severity, payload: Payload) {
        self.observer
            .observe(&Event::new(severity, payload).with_worker(self.id.clone()));
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("cycles", &self.cycles())
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::{EventLog, NullObserver};
    use crate::process::delay::NoDelay;
    use crate::process::work::TreasureHunt;
    use pretty_assertions::assert_eq;

    fn solo_worker(
        work: Arc<dyn CriticalWork>,
        observer: Arc<dyn Observer>,
    ) -> (Worker, Arc<SharedResources>, StopFlag) {
        let shared = Arc::new(SharedResources::new(1, 1, Arc::new(NullObserver)).unwrap());
        let stop = StopFlag::new();
        let worker = Worker::new(
            WorkerId::with_prefix("W", 1),
            Arc::clone(&shared),
            stop.clone(),
            PhaseTimings::instant(),
            Arc::new(NoDelay),
            work,
            observer,
        );
        (worker, shared, stop)
    }

    #[test]
    fn test_single_cycle_phase_order() {
        let log = EventLog::new();
        let (worker, shared, stop) = solo_worker(Arc::new(TreasureHunt), Arc::new(log.clone()));
        stop.raise();

        let report = worker.run();

        assert_eq!(report.cycles, 1);
        assert_eq!(report.outcome, WorkerOutcome::Stopped);
        let phases: Vec<_> = log.events().iter().filter_map(Event::entered_phase).collect();
        assert_eq!(phases, Phase::ALL.to_vec());
        assert_eq!(shared.inbox.len(), 1);
        assert_eq!(shared.barrier.participants(), 0);
    }

    #[test]
    fn test_failing_work_releases_everything() {
        let fail = |_: &WorkerId, _: u64| -> Result<String, WorkError> {
            Err(WorkError::Failed("cave-in".into()))
        };
        let (worker, shared, _stop) = solo_worker(Arc::new(fail), Arc::new(NullObserver));

        let report = worker.run();

        assert_eq!(report.cycles, 0);
        assert_eq!(report.outcome, WorkerOutcome::Failed("Work failed: cave-in".into()));
        assert!(!shared.treasure.is_held());
        assert_eq!(shared.pool.available_permits(), 1);
        assert!(shared.inbox.is_empty());
    }

    #[test]
    fn test_panicking_work_is_contained() {
        let explode = |_: &WorkerId, _: u64| -> Result<String, WorkError> { panic!("trap door") };
        let log = EventLog::new();
        let (worker, shared, _stop) = solo_worker(Arc::new(explode), Arc::new(log.clone()));

        let report = worker.run();

        assert_eq!(report.outcome, WorkerOutcome::Panicked("trap door".into()));
        assert!(!shared.treasure.is_held());
        assert_eq!(shared.pool.available_permits(), 1);
        assert!(log
            .events()
            .iter()
            .any(|e| matches!(e.payload, Payload::WorkerFailed { .. })));
    }

    #[test]
    fn test_panicking_observer_is_contained() {
        let observer = |_: &Event| panic!("observer down");
        let (worker, shared, _stop) =
            solo_worker(Arc::new(TreasureHunt), Arc::new(observer));

        let report = worker.run();

        assert_eq!(report.outcome, WorkerOutcome::Panicked("observer down".into()));
        assert_eq!(report.cycles, 0);
        assert_eq!(shared.barrier.participants(), 0);
    }
}
