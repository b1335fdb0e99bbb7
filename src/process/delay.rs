/*!
 * Delay Provider
 *
 * Pacing for the preparing, collecting and idle phases. Injected so tests
 * can swap the random source for something deterministic.
 */

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Picks how long a phase should take
pub trait DelayProvider: Send + Sync {
    fn random_delay(&self, min: Duration, max: Duration) -> Duration;
}

impl<F> DelayProvider for F
where
    F: Fn(Duration, Duration) -> Duration + Send + Sync,
{
    #[inline]
    fn random_delay(&self, min: Duration, max: Duration) -> Duration {
        self(min, max)
    }
}

/// Uniformly distributed delay in `[min, max]`
#[derive(Debug)]
pub struct RandomDelay {
    rng: Mutex<StdRng>,
}

impl RandomDelay {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence of delays
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomDelay {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayProvider for RandomDelay {
    fn random_delay(&self, min: Duration, max: Duration) -> Duration {
        if max <= min {
            return min;
        }
        let min_ns = min.as_nanos() as u64;
        let max_ns = max.as_nanos() as u64;
        Duration::from_nanos(self.rng.lock().gen_range(min_ns..=max_ns))
    }
}

/// Same delay for every phase, ignoring the requested range
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl DelayProvider for FixedDelay {
    #[inline]
    fn random_delay(&self, _min: Duration, _max: Duration) -> Duration {
        self.0
    }
}

/// No pacing at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl DelayProvider for NoDelay {
    #[inline]
    fn random_delay(&self, _min: Duration, _max: Duration) -> Duration {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_delay_within_range() {
        let delay = RandomDelay::new();
        let (min, max) = (Duration::from_millis(10), Duration::from_millis(20));
        for _ in 0..100 {
            let d = delay.random_delay(min, max);
            assert!(d >= min && d <= max, "{d:?} outside range");
        }
    }

    #[test]
    fn test_seeded_delay_is_reproducible() {
        let (min, max) = (Duration::from_secs(1), Duration::from_secs(2));
        let a = RandomDelay::seeded(7);
        let b = RandomDelay::seeded(7);
        for _ in 0..10 {
            assert_eq!(a.random_delay(min, max), b.random_delay(min, max));
        }
    }

    #[test]
    fn test_degenerate_range() {
        let d = Duration::from_millis(5);
        assert_eq!(RandomDelay::new().random_delay(d, d), d);
    }

    #[test]
    fn test_closure_provider() {
        let half = |min: Duration, max: Duration| (min + max) / 2;
        assert_eq!(
            half.random_delay(Duration::from_secs(1), Duration::from_secs(3)),
            Duration::from_secs(2)
        );
        assert_eq!(NoDelay.random_delay(Duration::from_secs(1), Duration::from_secs(3)), Duration::ZERO);
    }
}
