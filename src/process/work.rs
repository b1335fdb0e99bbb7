/*!
 * Critical-Section Work
 *
 * The step a worker performs while holding the treasure lock. It returns the
 * text to publish; an error ends that worker only.
 */

use crate::core::errors::WorkError;
use crate::core::types::WorkerId;

pub trait CriticalWork: Send + Sync {
    /// Produce the message for `worker`'s `cycle` (1-based)
    fn perform(&self, worker: &WorkerId, cycle: u64) -> Result<String, WorkError>;
}

impl<F> CriticalWork for F
where
    F: Fn(&WorkerId, u64) -> Result<String, WorkError> + Send + Sync,
{
    #[inline]
    fn perform(&self, worker: &WorkerId, cycle: u64) -> Result<String, WorkError> {
        self(worker, cycle)
    }
}

/// Default work step
#[derive(Debug, Clone, Copy, Default)]
pub struct TreasureHunt;

impl CriticalWork for TreasureHunt {
    fn perform(&self, worker: &WorkerId, _cycle: u64) -> Result<String, WorkError> {
        Ok(format!("{} collected a treasure!", worker.name))
    }
}
