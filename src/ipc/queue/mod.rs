/*!
 * Queue Module
 * Unbounded FIFO message queue with blocking receive
 */

mod fifo;
mod types;

// Re-export public API
pub use fifo::BlockingQueue;
pub use types::{QueueMessage, QueuePayload};
