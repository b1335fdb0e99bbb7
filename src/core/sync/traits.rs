/*!
 * Synchronization Traits
 *
 * Shared result types for wait/notify operations.
 */

/// Result of a wake operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeResult {
    /// Successfully woke N waiters (N >= 1)
    Woken(usize),
    /// No waiters were waiting
    NoWaiters,
}

impl WakeResult {
    /// Check if any waiters were woken
    #[inline(always)]
    pub fn is_woken(&self) -> bool {
        matches!(self, WakeResult::Woken(_))
    }

    /// Get number of woken waiters (0 if none)
    #[inline(always)]
    pub fn count(&self) -> usize {
        match self {
            WakeResult::Woken(n) => *n,
            WakeResult::NoWaiters => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wake_result_count() {
        assert_eq!(WakeResult::Woken(3).count(), 3);
        assert!(WakeResult::Woken(1).is_woken());
        assert_eq!(WakeResult::NoWaiters.count(), 0);
        assert!(!WakeResult::NoWaiters.is_woken());
    }
}
