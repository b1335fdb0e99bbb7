/*!
 * Synchronization Primitives
 *
 * Blocking coordination primitives built on `parking_lot` mutexes and
 * condition variables:
 * - [`Lock`]: exclusive access, released through a scoped guard
 * - [`CountingSemaphore`]: bounded admission with FIFO hand-off
 * - [`CyclicBarrier`]: reusable rendezvous with a single broadcast release
 *
 * # Architecture
 *
 * Every primitive keeps its state behind one internal mutex and follows the
 * same pattern: hold the mutex, check the predicate in a loop, park, recheck.
 * Waiters that need strict FIFO service park on their own slot in a
 * [`WaitList`] so a wake-up reaches exactly the intended thread.
 *
 * All blocking operations have a `_timeout` variant so callers can layer
 * deadlines on top; the plain variants block indefinitely.
 */

mod barrier;
mod lock;
mod semaphore;
mod traits;
mod wait;

pub use barrier::{BarrierWaitResult, CyclicBarrier};
pub use lock::Lock;
pub use semaphore::CountingSemaphore;
pub use traits::WakeResult;
pub use wait::{WaitList, Waiter};
