/*!
 * Process Module
 * Worker lifecycle: configuration, the per-worker state machine and the
 * coordinator that owns the shared primitives
 */

pub mod config;
pub mod coordinator;
pub mod delay;
pub mod stop;
pub mod types;
pub mod work;
pub mod worker;

// Re-export for convenience
pub use config::{AdventureConfig, DelayRange, PhaseTimings};
pub use coordinator::{Coordinator, CoordinatorBuilder};
pub use delay::{DelayProvider, FixedDelay, NoDelay, RandomDelay};
pub use stop::StopFlag;
pub use types::{Phase, ShutdownReport, WorkerOutcome, WorkerReport};
pub use work::{CriticalWork, TreasureHunt};
pub use worker::{SharedResources, Worker};
