/*!
 * System Limits and Constants
 *
 * Defaults for the adventure party and its pacing, grouped by domain.
 */

use std::time::Duration;

// =============================================================================
// PARTY LIMITS
// =============================================================================

/// Number of concurrent workers in a default party
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Concurrent critical-section admissions
/// Must stay below the worker count so the semaphore actually blocks someone
pub const DEFAULT_POOL_CAPACITY: usize = 2;

/// Smallest party where barrier and semaphore contention is observable
pub const MIN_WORKER_COUNT: usize = 2;

/// Prefix used to name workers ("W1", "W2", ...)
pub const DEFAULT_NAME_PREFIX: &str = "W";

// =============================================================================
// PACING
// =============================================================================

/// Preparation before the rendezvous
pub const PREPARE_DELAY_MIN: Duration = Duration::from_secs(1);
pub const PREPARE_DELAY_MAX: Duration = Duration::from_secs(2);

/// Exclusive treasure collection
pub const COLLECT_DELAY_MIN: Duration = Duration::from_secs(3);
pub const COLLECT_DELAY_MAX: Duration = Duration::from_secs(6);

/// Rest between adventures
pub const IDLE_DELAY_MIN: Duration = Duration::from_secs(5);
pub const IDLE_DELAY_MAX: Duration = Duration::from_secs(10);

