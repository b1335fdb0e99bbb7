/*!
 * Queue Types
 * Message type published by workers and the payload contract
 */

use crate::core::types::WorkerId;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::time::SystemTime;

/// Anything a [`BlockingQueue`](super::BlockingQueue) can carry
///
/// `describe` supplies the text reported to observers on send/receive.
pub trait QueuePayload: Send {
    fn describe(&self) -> Cow<'_, str>;

    /// Worker that produced the payload, if known
    fn sender(&self) -> Option<&WorkerId> {
        None
    }

    /// Called by the queue at send time with a strictly increasing number
    fn assign_seq(&mut self, _seq: u64) {}
}

impl QueuePayload for String {
    fn describe(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl QueuePayload for &'static str {
    fn describe(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

/// Result published by a worker at the end of its critical section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueMessage {
    /// Send order within the queue, starting at 1; 0 until sent
    pub seq: u64,
    pub sender: WorkerId,
    /// 1-based cycle of the sender that produced this message
    pub cycle: u64,
    pub body: String,
    pub timestamp: SystemTime,
}

impl QueueMessage {
    pub fn new(sender: WorkerId, cycle: u64, body: impl Into<String>) -> Self {
        Self {
            seq: 0,
            sender,
            cycle,
            body: body.into(),
            timestamp: SystemTime::now(),
        }
    }
}

impl QueuePayload for QueueMessage {
    fn describe(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.body)
    }

    fn sender(&self) -> Option<&WorkerId> {
        Some(&self.sender)
    }

    fn assign_seq(&mut self, seq: u64) {
        self.seq = seq;
    }
}
