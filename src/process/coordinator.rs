/*!
 * Coordinator
 * Owns the shared primitives and the worker threads of one party
 *
 * Lifecycle: `builder(config).start()` spawns every worker, `request_stop()`
 * raises the stop flag, `await_shutdown()` joins the workers and drains the
 * inbox. Workers report their exit on an internal queue so a shutdown can be
 * waited on with a deadline and retried.
 */

use super::config::AdventureConfig;
use super::delay::{DelayProvider, RandomDelay};
use super::stop::StopFlag;
use super::types::{ShutdownReport, WorkerOutcome, WorkerReport};
use super::work::{CriticalWork, TreasureHunt};
use super::worker::{SharedResources, Worker};
use crate::core::errors::{ConfigError, CoordinatorError, CoordinatorResult};
use crate::core::types::WorkerId;
use crate::ipc::BlockingQueue;
use crate::monitoring::{span_party, Event, NullObserver, Observer, Payload, Severity};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, warn, Span};
use uuid::Uuid;

/// Builder for [`Coordinator`]
pub struct CoordinatorBuilder {
    config: AdventureConfig,
    observer: Arc<dyn Observer>,
    delay: Arc<dyn DelayProvider>,
    work: Arc<dyn CriticalWork>,
    stop: StopFlag,
}

impl CoordinatorBuilder {
    pub fn new(config: AdventureConfig) -> Self {
        Self {
            config,
            observer: Arc::new(NullObserver),
            delay: Arc::new(RandomDelay::new()),
            work: Arc::new(TreasureHunt),
            stop: StopFlag::new(),
        }
    }

    /// Receive every lifecycle, phase and queue event
    pub fn observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// Pacing source (defaults to [`RandomDelay`])
    pub fn delay(mut self, delay: impl DelayProvider + 'static) -> Self {
        self.delay = Arc::new(delay);
        self
    }

    /// Critical-section step (defaults to [`TreasureHunt`])
    pub fn work(mut self, work: impl CriticalWork + 'static) -> Self {
        self.work = Arc::new(work);
        self
    }

    /// Share an existing stop flag, e.g. one raised from an observer
    pub fn stop_flag(mut self, stop: StopFlag) -> Self {
        self.stop = stop;
        self
    }

    /// Validate the config, create the primitives and spawn every worker
    pub fn start(self) -> CoordinatorResult<Coordinator> {
        self.config.validate()?;

        let worker_count = self.config.worker_count;
        let shared = SharedResources::new(
            worker_count,
            self.config.pool_capacity,
            Arc::clone(&self.observer),
        )
        .map_err(|_| ConfigError::InvalidWorkerCount(worker_count))?;
        let shared = Arc::new(shared);
        let exits = Arc::new(BlockingQueue::new());
        let (span, run_id) = span_party(worker_count);

        let mut coordinator = Coordinator {
            config: self.config,
            shared,
            stop: self.stop,
            observer: self.observer,
            exits,
            handles: Vec::with_capacity(worker_count),
            reports: Vec::with_capacity(worker_count),
            run_id,
            span,
            shut_down: false,
        };

        for index in 1..=worker_count {
            let id = WorkerId::with_prefix(&coordinator.config.name_prefix, index);
            if let Err(source) = coordinator.spawn(id.clone(), &self.delay, &self.work) {
                coordinator.abort_start(worker_count - index + 1);
                return Err(CoordinatorError::Spawn {
                    name: id.name,
                    source,
                });
            }
        }

        coordinator.span.in_scope(|| {
            info!(
                run_id = %coordinator.run_id,
                workers = worker_count,
                permits = coordinator.config.pool_capacity,
                "party started"
            )
        });

        Ok(coordinator)
    }
}

/// A running party of workers
pub struct Coordinator {
    config: AdventureConfig,
    shared: Arc<SharedResources>,
    stop: StopFlag,
    observer: Arc<dyn Observer>,
    exits: Arc<BlockingQueue<WorkerReport>>,
    handles: Vec<JoinHandle<()>>,
    reports: Vec<WorkerReport>,
    run_id: Uuid,
    span: Span,
    shut_down: bool,
}

impl Coordinator {
    pub fn builder(config: AdventureConfig) -> CoordinatorBuilder {
        CoordinatorBuilder::new(config)
    }

    /// Raise the stop flag; workers exit after their current cycle
    ///
    /// Idempotent and non-blocking.
    pub fn request_stop(&self) {
        if self.stop.raise() {
            debug!(run_id = %self.run_id, "stop flag raised");
            self.observer
                .observe(&Event::new(Severity::Warn, Payload::StopRequested));
        }
    }

    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop.is_raised()
    }

    pub fn config(&self) -> &AdventureConfig {
        &self.config
    }

    pub fn shared(&self) -> &SharedResources {
        &self.shared
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Workers that have not reported their exit yet
    pub fn pending_workers(&self) -> usize {
        self.handles
            .len()
            .saturating_sub(self.reports.len() + self.exits.len())
    }

    /// Block until every worker has exited, then drain the inbox
    ///
    /// Does not raise the stop flag itself; see [`Coordinator::shutdown`].
    pub fn await_shutdown(&mut self) -> CoordinatorResult<ShutdownReport> {
        self.ensure_running()?;
        while self.reports.len() < self.handles.len() {
            let report = self.exits.receive();
            self.record(report);
        }
        Ok(self.finish())
    }

    /// Like [`Coordinator::await_shutdown`], giving up after `timeout`
    ///
    /// On timeout the coordinator stays usable and the call can be retried.
    pub fn await_shutdown_timeout(
        &mut self,
        timeout: Duration,
    ) -> CoordinatorResult<ShutdownReport> {
        self.ensure_running()?;
        let deadline = Instant::now() + timeout;
        while self.reports.len() < self.handles.len() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.exits.receive_timeout(remaining) {
                Ok(report) => self.record(report),
                Err(_) => {
                    let pending = self.handles.len() - self.reports.len();
                    warn!(run_id = %self.run_id, pending, ?timeout, "shutdown deadline elapsed");
                    return Err(CoordinatorError::ShutdownTimeout { pending });
                }
            }
        }
        Ok(self.finish())
    }

    /// `request_stop` followed by `await_shutdown`
    pub fn shutdown(&mut self) -> CoordinatorResult<ShutdownReport> {
        self.request_stop();
        self.await_shutdown()
    }

    fn spawn(
        &mut self,
        id: WorkerId,
        delay: &Arc<dyn DelayProvider>,
        work: &Arc<dyn CriticalWork>,
    ) -> std::io::Result<()> {
        let worker = Worker::new(
            id.clone(),
            Arc::clone(&self.shared),
            self.stop.clone(),
            self.config.timings,
            Arc::clone(delay),
            Arc::clone(work),
            Arc::clone(&self.observer),
        );
        let exits = Arc::clone(&self.exits);
        let span = info_span!(parent: &self.span, "worker", worker = %id);

        let handle = thread::Builder::new()
            .name(format!("worker-{}", id.name))
            .spawn(move || {
                let _enter = span.enter();
                let mut notice = ExitNotice {
                    worker: &worker,
                    exits: &exits,
                    report: None,
                };
                notice.report = Some(worker.run());
            })?;
        self.handles.push(handle);
        Ok(())
    }

    /// Undo a partial start: unblock the spawned workers and wait for them
    fn abort_start(&mut self, unspawned: usize) {
        self.stop.raise();
        for _ in 0..unspawned {
            self.shared.barrier.leave();
        }
        while self.reports.len() < self.handles.len() {
            let report = self.exits.receive();
            self.record(report);
        }
        self.join_all();
        self.shut_down = true;
    }

    fn ensure_running(&self) -> CoordinatorResult<()> {
        if self.shut_down {
            Err(CoordinatorError::AlreadyShutDown)
        } else {
            Ok(())
        }
    }

    fn record(&mut self, report: WorkerReport) {
        debug!(worker = %report.worker, cycles = report.cycles, "worker reported exit");
        self.reports.push(report);
    }

    fn join_all(&mut self) {
        for handle in self.handles.drain(..) {
            let name = handle.thread().name().map(str::to_owned);
            if handle.join().is_err() {
                warn!(thread = ?name, "worker thread panicked after reporting");
            }
        }
    }

    fn finish(&mut self) -> ShutdownReport {
        self.join_all();

        let messages = self.shared.inbox.drain();
        let mut workers = std::mem::take(&mut self.reports);
        workers.sort_by_key(|r| r.worker.index);

        self.observer.observe(&Event::new(
            Severity::Info,
            Payload::ShutdownComplete {
                drained: messages.len(),
            },
        ));
        info!(
            run_id = %self.run_id,
            drained = messages.len(),
            failures = workers.iter().filter(|r| r.is_failure()).count(),
            "party shut down"
        );
        self.shut_down = true;

        ShutdownReport { messages, workers }
    }
}

/// Posts the worker's exit report when its thread ends, even by unwinding
struct ExitNotice<'a> {
    worker: &'a Worker,
    exits: &'a BlockingQueue<WorkerReport>,
    report: Option<WorkerReport>,
}

impl Drop for ExitNotice<'_> {
    fn drop(&mut self) {
        let report = self.report.take().unwrap_or_else(|| WorkerReport {
            worker: self.worker.id().clone(),
            cycles: self.worker.cycles(),
            outcome: WorkerOutcome::Panicked("worker thread unwound".to_string()),
        });
        self.exits.send(report);
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        if !self.shut_down {
            // Threads are left detached; they exit after their current cycle.
            self.stop.raise();
        }
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("run_id", &self.run_id)
            .field("config", &self.config)
            .field("stop_requested", &self.stop.is_raised())
            .field("shut_down", &self.shut_down)
            .finish()
    }
}
