/*!
 * Cyclic Barrier
 *
 * Reusable rendezvous point. Each generation is released by the arrival
 * that completes it, with a single `notify_all` while the state mutex is
 * held, so no waiter can observe a partial release.
 *
 * # Departure
 *
 * `capacity` is fixed for the lifetime of the barrier. A participant that
 * stops taking part for good calls [`CyclicBarrier::leave`]; the threshold
 * for later generations becomes `capacity - departed`. Without this, peers
 * that already started another round would wait forever for a thread that
 * has exited.
 */

use crate::core::errors::{SyncError, SyncResult};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug, Default)]
struct BarrierState {
    arrived: usize,
    departed: usize,
    generation: u64,
}

/// Outcome of a barrier wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierWaitResult {
    /// Generation this caller was released in (starts at 0)
    pub generation: u64,
    /// True for the arrival that completed the generation
    pub is_leader: bool,
}

/// Reusable rendezvous for a fixed number of participants
///
/// # Examples
///
/// ```
/// use adventure_kernel::core::sync::CyclicBarrier;
///
/// let barrier = CyclicBarrier::new(1).unwrap();
/// let first = barrier.wait().unwrap();
/// let second = barrier.wait().unwrap();
/// assert!(first.is_leader);
/// assert_eq!(second.generation, first.generation + 1);
/// ```
#[derive(Debug)]
pub struct CyclicBarrier {
    capacity: usize,
    state: Mutex<BarrierState>,
    released: Condvar,
}

impl CyclicBarrier {
    pub fn new(capacity: usize) -> SyncResult<Self> {
        if capacity == 0 {
            return Err(SyncError::InvalidCapacity(capacity));
        }
        Ok(Self {
            capacity,
            state: Mutex::new(BarrierState::default()),
            released: Condvar::new(),
        })
    }

    /// Arrive and block until the current generation is complete
    pub fn wait(&self) -> SyncResult<BarrierWaitResult> {
        let mut state = self.state.lock();
        let generation = self.arrive(&mut state)?;
        if let Some(result) = self.try_release(&mut state) {
            return Ok(result);
        }

        while state.generation == generation {
            self.released.wait(&mut state);
        }
        Ok(BarrierWaitResult {
            generation,
            is_leader: false,
        })
    }

    /// Like [`wait`](Self::wait), but withdraws the arrival after `timeout`
    pub fn wait_timeout(&self, timeout: Duration) -> SyncResult<BarrierWaitResult> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        let generation = self.arrive(&mut state)?;
        if let Some(result) = self.try_release(&mut state) {
            return Ok(result);
        }

        while state.generation == generation {
            if self.released.wait_until(&mut state, deadline).timed_out()
                && state.generation == generation
            {
                state.arrived -= 1;
                return Err(SyncError::Timeout(timeout));
            }
        }
        Ok(BarrierWaitResult {
            generation,
            is_leader: false,
        })
    }

    /// Permanently withdraw one participant
    ///
    /// Releases the current generation if everyone still taking part has
    /// already arrived.
    pub fn leave(&self) {
        let mut state = self.state.lock();
        state.departed = (state.departed + 1).min(self.capacity);
        trace!(departed = state.departed, "participant left barrier");
        if state.arrived > 0 {
            self.try_release(&mut state);
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Callers blocked in the current generation
    pub fn arrived(&self) -> usize {
        self.state.lock().arrived
    }

    /// Generations completed so far
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Participants still expected per generation
    pub fn participants(&self) -> usize {
        let state = self.state.lock();
        self.capacity - state.departed
    }

    fn arrive(&self, state: &mut MutexGuard<'_, BarrierState>) -> SyncResult<u64> {
        if state.departed >= self.capacity {
            return Err(SyncError::BarrierAbandoned);
        }
        state.arrived += 1;
        Ok(state.generation)
    }

    fn try_release(&self, state: &mut MutexGuard<'_, BarrierState>) -> Option<BarrierWaitResult> {
        if state.arrived < self.capacity - state.departed {
            return None;
        }
        let generation = state.generation;
        state.arrived = 0;
        state.generation = generation.wrapping_add(1);
        self.released.notify_all();
        trace!(generation, "barrier released");
        Some(BarrierWaitResult {
            generation,
            is_leader: true,
        })
    }
}
