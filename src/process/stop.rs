/*!
 * Cooperative Stop Flag
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared, write-once-per-shutdown stop signal
///
/// Workers only read it between full cycles; raising it never interrupts a
/// thread blocked inside a primitive.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag; returns `true` only for the call that raised it
    pub fn raise(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    #[inline]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_is_idempotent() {
        let flag = StopFlag::new();
        let view = flag.clone();

        assert!(!view.is_raised());
        assert!(flag.raise());
        assert!(!flag.raise());
        assert!(view.is_raised());
    }
}
