/*!
 * Semaphore Permit
 *
 * Scoped hold on one permit of a [`CountingSemaphore`].
 */

use super::traits::Guard;
use super::{GuardError, GuardMetadata, GuardResult};
use crate::core::sync::CountingSemaphore;
use std::fmt;

/// One outstanding permit; returned to the pool on drop
#[must_use = "dropping the permit returns it to the pool immediately"]
pub struct Permit<'a> {
    semaphore: &'a CountingSemaphore,
    metadata: GuardMetadata,
    held: bool,
}

impl<'a> Permit<'a> {
    pub(crate) fn new(semaphore: &'a CountingSemaphore) -> Self {
        Self {
            semaphore,
            metadata: GuardMetadata::new("permit"),
            held: true,
        }
    }

    /// Keep the permit consumed; the pool shrinks by one
    pub fn forget(mut self) {
        self.held = false;
    }
}

impl Guard for Permit<'_> {
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
        self.semaphore.release();
        Ok(())
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if self.held {
            self.held = false;
            self.semaphore.release();
        }
    }
}

impl fmt::Debug for Permit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Permit").field("held", &self.held).finish()
    }
}
