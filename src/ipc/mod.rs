/*!
 * Inter-Worker Communication
 * Shared inbox used by workers to publish results
 */

pub mod queue;

pub use queue::{BlockingQueue, QueueMessage, QueuePayload};
