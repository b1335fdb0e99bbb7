/*!
 * Observability
 * Structured events for every worker transition and queue operation
 *
 * The core never formats narration itself. It emits [`Event`]s to an
 * injected [`Observer`]; the binary attaches a [`TracingObserver`] to turn
 * them into log lines.
 */

pub mod collection;
pub mod events;
mod tracer;

pub use collection::{Collector, EventLog, NullObserver, Observer};
pub use events::{Event, Payload, Severity};
pub use tracer::{init_tracing, span_party, TracingObserver};
