/*!
 * FIFO Queue
 * Unbounded first-in-first-out queue with blocking receive
 *
 * # Design: Direct Hand-off
 *
 * Receivers park on a FIFO [`WaitList`]. When a send finds receivers
 * parked, the message skips the deque and goes straight to the oldest
 * receiver's hand-off slot before that receiver is woken. A message only
 * waits in the deque while nobody is parked, so the deque and the wait
 * list are never both non-empty and a newcomer can never take a message
 * meant for an earlier receiver.
 *
 * Every message gets a sequence number under the queue mutex at send time,
 * so sequence order is send order.
 */

use super::types::QueuePayload;
use crate::core::errors::{SyncError, SyncResult};
use crate::core::sync::{WaitList, Waiter};
use crate::monitoring::{Event, Observer, Payload, Severity};
use parking_lot::{Mutex, MutexGuard};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct QueueState<T> {
    messages: VecDeque<T>,
    receivers: WaitList,
    /// Messages already assigned to a woken receiver
    handoffs: Vec<(Arc<Waiter>, T)>,
    /// Last sequence number assigned
    last_seq: u64,
}

/// Unbounded blocking FIFO queue
///
/// Observer events are emitted while the queue mutex is held, so their
/// order always matches queue order.
///
/// # Examples
///
/// ```
/// use adventure_kernel::ipc::BlockingQueue;
///
/// let queue = BlockingQueue::new();
/// queue.send("first".to_string());
/// queue.send("second".to_string());
/// assert_eq!(queue.receive(), "first");
/// assert_eq!(queue.drain(), vec!["second".to_string()]);
/// ```
pub struct BlockingQueue<T> {
    state: Mutex<QueueState<T>>,
    observer: Option<Arc<dyn Observer>>,
}

impl<T: QueuePayload> BlockingQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                messages: VecDeque::new(),
                receivers: WaitList::new(),
                handoffs: Vec::new(),
                last_seq: 0,
            }),
            observer: None,
        }
    }

    /// Report every send and receive to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Stamp the next sequence number and deliver to the oldest parked
    /// receiver, or append to the tail if nobody is parked
    pub fn send(&self, mut message: T) {
        let mut state = self.state.lock();
        state.last_seq += 1;
        message.assign_seq(state.last_seq);
        self.emit(&message, |message| Payload::MessageSent { message });
        let receiver = state.receivers.wake_head();
        match receiver {
            Some(receiver) => state.handoffs.push((receiver, message)),
            None => state.messages.push_back(message),
        }
    }

    /// Block until a message is available, then take the head
    pub fn receive(&self) -> T {
        let mut state = self.state.lock();
        loop {
            if let Some(message) = self.pop(&mut state) {
                return message;
            }
            let waiter = state.receivers.enqueue();
            waiter.park(&mut state);
            if let Some(message) = self.collect(&mut state, &waiter) {
                return message;
            }
        }
    }

    /// Take the head if there is one
    ///
    /// Never takes a message a parked receiver is owed.
    pub fn try_receive(&self) -> Option<T> {
        let mut state = self.state.lock();
        self.pop(&mut state)
    }

    /// Block until a message is available or `timeout` elapses
    pub fn receive_timeout(&self, timeout: Duration) -> SyncResult<T> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            if let Some(message) = self.pop(&mut state) {
                return Ok(message);
            }
            let waiter = state.receivers.enqueue();
            if !waiter.park_until(&mut state, deadline) {
                state.receivers.cancel(&waiter);
                return Err(SyncError::Timeout(timeout));
            }
            if let Some(message) = self.collect(&mut state, &waiter) {
                return Ok(message);
            }
        }
    }

    /// Take every queued message, oldest first
    ///
    /// Messages already handed to a parked receiver stay with it.
    pub fn drain(&self) -> Vec<T> {
        let mut state = self.state.lock();
        let drained: Vec<T> = state.messages.drain(..).collect();
        for message in &drained {
            self.emit(message, |message| Payload::MessageReceived { message });
        }
        drained
    }

    /// Messages waiting in the queue, not counting ones already handed off
    pub fn len(&self) -> usize {
        self.state.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().messages.is_empty()
    }

    /// Receivers currently blocked
    pub fn receiver_count(&self) -> usize {
        self.state.lock().receivers.len()
    }

    fn pop(&self, state: &mut MutexGuard<'_, QueueState<T>>) -> Option<T> {
        let message = state.messages.pop_front()?;
        self.emit(&message, |message| Payload::MessageReceived { message });
        Some(message)
    }

    /// Take the message handed to `waiter` by `send`
    fn collect(
        &self,
        state: &mut MutexGuard<'_, QueueState<T>>,
        waiter: &Arc<Waiter>,
    ) -> Option<T> {
        let slot = state
            .handoffs
            .iter()
            .position(|(owner, _)| Arc::ptr_eq(owner, waiter))?;
        let (_, message) = state.handoffs.swap_remove(slot);
        self.emit(&message, |message| Payload::MessageReceived { message });
        Some(message)
    }

    fn emit(&self, message: &T, payload: impl FnOnce(String) -> Payload) {
        if let Some(observer) = &self.observer {
            let mut event = Event::new(Severity::Info, payload(message.describe().into_owned()));
            event.worker = message.sender().cloned();
            observer.observe(&event);
        }
    }
}

impl<T: QueuePayload> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for BlockingQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BlockingQueue")
            .field("len", &state.messages.len())
            .field("receivers", &state.receivers.len())
            .field("handoffs", &state.handoffs.len())
            .field("last_seq", &state.last_seq)
            .finish()
    }
}
