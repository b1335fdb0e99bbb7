/*!
 * Counting Semaphore
 *
 * Bounded admission with strict FIFO service.
 *
 * # Design: Direct Hand-off
 *
 * `release()` adds a permit and, if anyone is queued, immediately passes it
 * to the head of the wait list before waking that thread. The woken thread
 * owns the permit as soon as it is notified, so a late arrival can never
 * slip in between the wake-up and the decrement. New arrivals only take a
 * free permit when nobody is queued ahead of them.
 *
 * `permits` is only touched while `state` is locked and is a `usize`, so it
 * can never go negative. There is no upper cap: releasing without a matching
 * acquire grows the pool.
 */

use super::traits::WakeResult;
use super::wait::WaitList;
use crate::core::errors::{SyncError, SyncResult};
use crate::core::guard::Permit;
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug)]
struct SemaphoreState {
    permits: usize,
    waiters: WaitList,
}

/// Counting semaphore with FIFO waiters
///
/// # Examples
///
/// ```
/// use adventure_kernel::core::sync::CountingSemaphore;
///
/// let pool = CountingSemaphore::new(2);
/// let a = pool.acquire();
/// let _b = pool.acquire();
/// assert!(pool.try_acquire().is_none());
/// drop(a);
/// assert!(pool.try_acquire().is_some());
/// ```
#[derive(Debug)]
pub struct CountingSemaphore {
    state: Mutex<SemaphoreState>,
}

impl CountingSemaphore {
    pub fn new(permits: usize) -> Self {
        Self {
            state: Mutex::new(SemaphoreState {
                permits,
                waiters: WaitList::new(),
            }),
        }
    }

    /// Take a permit, queueing behind earlier waiters if none is free
    pub fn acquire(&self) -> Permit<'_> {
        let mut state = self.state.lock();
        if Self::take_free(&mut state) {
            return Permit::new(self);
        }

        let waiter = state.waiters.enqueue();
        trace!(queued = state.waiters.len(), "semaphore exhausted, parking");
        waiter.park(&mut state);
        Permit::new(self)
    }

    /// Take a permit only if one is free and nobody is queued
    pub fn try_acquire(&self) -> Option<Permit<'_>> {
        let mut state = self.state.lock();
        Self::take_free(&mut state).then(|| Permit::new(self))
    }

    /// Take a permit, giving up after `timeout`
    pub fn acquire_timeout(&self, timeout: Duration) -> SyncResult<Permit<'_>> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        if Self::take_free(&mut state) {
            return Ok(Permit::new(self));
        }

        let waiter = state.waiters.enqueue();
        if waiter.park_until(&mut state, deadline) {
            return Ok(Permit::new(self));
        }
        state.waiters.cancel(&waiter);
        Err(SyncError::Timeout(timeout))
    }

    /// Return one permit to the pool
    ///
    /// Wakes exactly the longest-waiting thread, if any.
    pub fn release(&self) {
        let mut state = self.state.lock();
        match state.waiters.notify_one() {
            // Permit handed straight to the head waiter
            WakeResult::Woken(_) => {}
            WakeResult::NoWaiters => state.permits += 1,
        }
        trace!(permits = state.permits, "permit released");
    }

    /// Permits free right now
    pub fn available_permits(&self) -> usize {
        self.state.lock().permits
    }

    /// Threads currently queued in `acquire`
    pub fn waiter_count(&self) -> usize {
        self.state.lock().waiters.len()
    }

    fn take_free(state: &mut SemaphoreState) -> bool {
        if state.permits > 0 && state.waiters.is_empty() {
            state.permits -= 1;
            true
        } else {
            false
        }
    }
}
