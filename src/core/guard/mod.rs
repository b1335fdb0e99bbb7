/*!
 * RAII Resource Guards
 *
 * Scoped acquisition for the synchronization primitives.
 *
 * ## Design Principles
 *
 * 1. **Scoped**: Acquiring returns a guard; dropping it releases
 * 2. **Unwind-safe**: Release runs on panics and early `?` returns too
 * 3. **Checked**: Manual release through [`Guard::release`] fails on a second call
 *
 * ## Guard Types
 *
 * - **LockGuard**: Exclusive hold on a [`Lock`](crate::core::sync::Lock)
 * - **Permit**: One permit of a [`CountingSemaphore`](crate::core::sync::CountingSemaphore)
 *
 * ## Example
 *
 * ```rust
 * use adventure_kernel::core::sync::CountingSemaphore;
 *
 * let pool = CountingSemaphore::new(1);
 * {
 *     let _permit = pool.acquire();
 *     assert_eq!(pool.available_permits(), 0);
 * } // Released here
 * assert_eq!(pool.available_permits(), 1);
 * ```
 */

mod lock;
mod permit;
mod traits;

pub use lock::LockGuard;
pub use permit::Permit;
pub use traits::Guard;

/// Result type for guard operations
pub type GuardResult<T> = Result<T, GuardError>;

/// Errors that can occur during guard operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("Resource already released")]
    AlreadyReleased,
}

/// Guard metadata for observability
#[derive(Debug, Clone)]
pub struct GuardMetadata {
    pub resource_type: &'static str,
    pub creation_time: std::time::Instant,
}

impl GuardMetadata {
    #[inline]
    pub fn new(resource_type: &'static str) -> Self {
        Self {
            resource_type,
            creation_time: std::time::Instant::now(),
        }
    }

    /// How long the resource has been held
    #[inline]
    pub fn lifetime_micros(&self) -> u64 {
        self.creation_time.elapsed().as_micros() as u64
    }
}
