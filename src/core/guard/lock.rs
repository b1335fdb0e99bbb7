/*!
 * Lock Guard
 *
 * Scoped hold on a [`Lock`]. The lock is released exactly once: either
 * through [`Guard::release`] / [`LockGuard::unlock`] or when the guard drops.
 */

use super::traits::Guard;
use super::{GuardError, GuardMetadata, GuardResult};
use crate::core::sync::Lock;
use std::fmt;

/// Exclusive hold on a [`Lock`]
#[must_use = "dropping the guard releases the lock immediately"]
pub struct LockGuard<'a> {
    lock: &'a Lock,
    metadata: GuardMetadata,
    held: bool,
}

impl<'a> LockGuard<'a> {
    pub(crate) fn new(lock: &'a Lock) -> Self {
        Self {
            lock,
            metadata: GuardMetadata::new("lock"),
            held: true,
        }
    }

    /// Release the lock, consuming the guard
    pub fn unlock(mut self) {
        let _ = self.release();
    }
}

impl Guard for LockGuard<'_> {
    fn resource_type(&self) -> &'static str {
        self.metadata.resource_type
    }

    fn metadata(&self) -> &GuardMetadata {
        &self.metadata
    }

    fn is_active(&self) -> bool {
        self.held
    }

    fn release(&mut self) -> GuardResult<()> {
        if !self.held {
            return Err(GuardError::AlreadyReleased);
        }
        self.held = false;
        self.lock.unlock();
        Ok(())
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        if self.held {
            self.held = false;
            self.lock.unlock();
        }
    }
}

impl fmt::Debug for LockGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockGuard")
            .field("held", &self.held)
            .field("held_micros", &self.metadata.lifetime_micros())
            .finish()
    }
}
