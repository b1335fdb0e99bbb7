/*!
 * Collection
 * Observer hooks and event sinks
 */

mod collector;
mod log;
mod observer;

pub use collector::Collector;
pub use log::EventLog;
pub use observer::{NullObserver, Observer};
