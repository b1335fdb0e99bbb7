/*!
 * Core Module
 * Synchronization primitives, guards, identities and error handling
 */

pub mod errors;
pub mod guard;
pub mod limits;
pub mod sync;
pub mod types;

// Re-export for convenience
pub use errors::*;
pub use guard::{Guard, GuardResult, LockGuard, Permit};
pub use sync::{BarrierWaitResult, CountingSemaphore, CyclicBarrier, Lock};
pub use types::*;
