/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub use super::guard::GuardError;

/// Synchronization primitive errors
///
/// Spurious wakeups never show up here: every primitive re-checks its
/// predicate in a loop and only reports conditions the caller must act on.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SyncError {
    #[error("Wait timed out after {0:?}")]
    #[diagnostic(
        code(sync::timeout),
        help("The deadline elapsed before the primitive became available.")
    )]
    Timeout(Duration),

    #[error("Invalid capacity: {0}")]
    #[diagnostic(
        code(sync::invalid_capacity),
        help("Barriers need at least one participant.")
    )]
    InvalidCapacity(usize),

    #[error("Barrier abandoned: every participant has left")]
    #[diagnostic(
        code(sync::barrier_abandoned),
        help("No participant remains to complete the rendezvous.")
    )]
    BarrierAbandoned,
}

/// Configuration errors
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("Invalid worker count: {0} (need at least 2)")]
    #[diagnostic(code(config::worker_count))]
    InvalidWorkerCount(usize),

    #[error("Invalid pool capacity: {0} (need at least 1)")]
    #[diagnostic(code(config::pool_capacity))]
    InvalidPoolCapacity(usize),

    #[error("Pool capacity {pool_capacity} must be smaller than worker count {worker_count}")]
    #[diagnostic(
        code(config::pool_not_contended),
        help("With as many permits as workers the semaphore never blocks anyone.")
    )]
    PoolNotContended {
        worker_count: usize,
        pool_capacity: usize,
    },

    #[error("Invalid delay range for {phase}: min {min_ms}ms > max {max_ms}ms")]
    #[diagnostic(code(config::delay_range))]
    InvalidDelayRange {
        phase: &'static str,
        min_ms: u64,
        max_ms: u64,
    },

    #[error("Invalid value for {var}: {value:?}")]
    #[diagnostic(code(config::env))]
    Env { var: &'static str, value: String },

    #[error("Failed to parse config: {0}")]
    #[diagnostic(code(config::parse))]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read config: {0}")]
    #[diagnostic(code(config::io))]
    Io(#[from] std::io::Error),
}

/// Errors raised by the critical-section work step
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum WorkError {
    #[error("Work failed: {0}")]
    #[diagnostic(code(work::failed))]
    Failed(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Sync(#[from] SyncError),
}

/// Coordinator lifecycle errors
#[derive(Error, Debug, Diagnostic)]
pub enum CoordinatorError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to spawn worker {name}: {source}")]
    #[diagnostic(code(coordinator::spawn))]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Shutdown deadline elapsed with {pending} worker(s) still running")]
    #[diagnostic(
        code(coordinator::shutdown_timeout),
        help("Workers finish their current cycle before exiting; retry with a longer deadline.")
    )]
    ShutdownTimeout { pending: usize },

    #[error("Coordinator already shut down")]
    #[diagnostic(code(coordinator::already_shut_down))]
    AlreadyShutDown,
}

pub type SyncResult<T> = Result<T, SyncError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;
