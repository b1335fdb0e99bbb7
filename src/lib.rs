/*!
 * Adventure Kernel Library
 *
 * A party of worker threads coordinated by four blocking primitives: a
 * cyclic barrier, a counting semaphore, a mutual-exclusion lock and a FIFO
 * message queue. The coordinator spawns the workers, stops them
 * cooperatively and collects what they published.
 */

pub mod core;
pub mod ipc;
pub mod monitoring;
pub mod process;

// Re-exports
pub use crate::core::errors::{
    ConfigError, CoordinatorError, CoordinatorResult, GuardError, SyncError, SyncResult, WorkError,
};
pub use crate::core::guard::{Guard, LockGuard, Permit};
pub use crate::core::sync::{BarrierWaitResult, CountingSemaphore, CyclicBarrier, Lock};
pub use crate::core::types::WorkerId;
pub use ipc::{BlockingQueue, QueueMessage, QueuePayload};
pub use monitoring::{
    init_tracing, Collector, Event, EventLog, NullObserver, Observer, Payload, Severity,
    TracingObserver,
};
pub use process::{
    AdventureConfig, Coordinator, CoordinatorBuilder, CriticalWork, DelayProvider, DelayRange,
    FixedDelay, NoDelay, Phase, PhaseTimings, RandomDelay, ShutdownReport, StopFlag, TreasureHunt,
    WorkerOutcome, WorkerReport,
};
