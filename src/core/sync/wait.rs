/*!
 * FIFO Wait List
 *
 * Ordered list of parked threads, stored inside the state a primitive
 * protects with its own mutex.
 *
 * # Design: One Condvar Per Waiter
 *
 * A shared condvar cannot choose which thread `notify_one` wakes. Giving each
 * waiter its own condvar plus a `notified` flag lets the owner of the list
 * wake exactly the head, and lets the woken thread tell a real notification
 * apart from a spurious wake-up.
 *
 * All list operations and every read of `notified` that matters happen while
 * the owning mutex is held, so the flag never races with the list.
 */

use super::traits::WakeResult;
use parking_lot::{Condvar, MutexGuard};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A parked thread's slot
#[derive(Debug, Default)]
pub struct Waiter {
    condvar: Condvar,
    notified: AtomicBool,
}

impl Waiter {
    /// Whether the list owner has handed this waiter its wake-up
    #[inline]
    pub fn is_notified(&self) -> bool {
        self.notified.load(Ordering::Acquire)
    }

    /// Park until notified
    ///
    /// `guard` must be the guard of the mutex that protects the owning list.
    pub fn park<T>(&self, guard: &mut MutexGuard<'_, T>) {
        while !self.is_notified() {
            self.condvar.wait(guard);
        }
    }

    /// Park until notified or until `deadline`
    ///
    /// Returns `true` if notified. On `false` the waiter is still queued and
    /// the caller must [`WaitList::cancel`] it before releasing the mutex.
    pub fn park_until<T>(&self, guard: &mut MutexGuard<'_, T>, deadline: Instant) -> bool {
        while !self.is_notified() {
            if self.condvar.wait_until(guard, deadline).timed_out() {
                return self.is_notified();
            }
        }
        true
    }

    fn wake(&self) {
        self.notified.store(true, Ordering::Release);
        self.condvar.notify_one();
    }
}

/// FIFO list of parked threads
#[derive(Debug, Default)]
pub struct WaitList {
    waiters: VecDeque<Arc<Waiter>>,
}

impl WaitList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new waiter at the tail
    pub fn enqueue(&mut self) -> Arc<Waiter> {
        let waiter = Arc::new(Waiter::default());
        self.waiters.push_back(Arc::clone(&waiter));
        waiter
    }

    /// Wake the head of the list
    pub fn notify_one(&mut self) -> WakeResult {
        match self.wake_head() {
            Some(_) => WakeResult::Woken(1),
            None => WakeResult::NoWaiters,
        }
    }

    /// Wake the head of the list and return it, so the caller can hand it
    /// something before releasing the mutex
    pub fn wake_head(&mut self) -> Option<Arc<Waiter>> {
        let waiter = self.waiters.pop_front()?;
        waiter.wake();
        Some(waiter)
    }

    /// Wake every queued waiter, oldest first
    pub fn notify_all(&mut self) -> WakeResult {
        let count = self.waiters.len();
        if count == 0 {
            return WakeResult::NoWaiters;
        }
        for waiter in self.waiters.drain(..) {
            waiter.wake();
        }
        WakeResult::Woken(count)
    }

    /// Remove a waiter that gave up (timeout)
    ///
    /// Returns `false` if it was no longer queued, i.e. it was notified.
    pub fn cancel(&mut self, waiter: &Arc<Waiter>) -> bool {
        match self.waiters.iter().position(|w| Arc::ptr_eq(w, waiter)) {
            Some(pos) => {
                self.waiters.remove(pos);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }
}
