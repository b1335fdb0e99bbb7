/*!
 * Lock
 *
 * Binary exclusive-access primitive. Waiters are woken one at a time in
 * whatever order the underlying condvar chooses: unspecified, but not
 * starving in practice because critical sections are short.
 *
 * Not re-entrant: acquiring twice on the same thread deadlocks.
 */

use crate::core::errors::{SyncError, SyncResult};
use crate::core::guard::LockGuard;
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Exclusive-access lock with scoped release
///
/// # Examples
///
/// ```
/// use adventure_kernel::core::sync::Lock;
///
/// let lock = Lock::new();
/// {
///     let _guard = lock.acquire();
///     assert!(lock.try_acquire().is_none());
/// }
/// assert!(!lock.is_held());
/// ```
#[derive(Debug, Default)]
pub struct Lock {
    held: Mutex<bool>,
    released: Condvar,
}

impl Lock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the lock is free, then take it
    pub fn acquire(&self) -> LockGuard<'_> {
        let mut held = self.held.lock();
        while *held {
            self.released.wait(&mut held);
        }
        *held = true;
        LockGuard::new(self)
    }

    /// Take the lock only if it is free right now
    pub fn try_acquire(&self) -> Option<LockGuard<'_>> {
        let mut held = self.held.lock();
        if *held {
            return None;
        }
        *held = true;
        Some(LockGuard::new(self))
    }

    /// Block until the lock is free or `timeout` elapses
    pub fn acquire_timeout(&self, timeout: Duration) -> SyncResult<LockGuard<'_>> {
        let deadline = Instant::now() + timeout;
        let mut held = self.held.lock();
        while *held {
            if self.released.wait_until(&mut held, deadline).timed_out() && *held {
                return Err(SyncError::Timeout(timeout));
            }
        }
        *held = true;
        Ok(LockGuard::new(self))
    }

    /// Whether some guard currently holds the lock
    pub fn is_held(&self) -> bool {
        *self.held.lock()
    }

    /// Only called by `LockGuard`, which tracks that it holds the lock
    pub(crate) fn unlock(&self) {
        *self.held.lock() = false;
        self.released.notify_one();
    }
}
