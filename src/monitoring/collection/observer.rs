/*!
 * Observer Hook
 */

use crate::monitoring::events::Event;

/// Receives every event the core emits
///
/// Called synchronously on the emitting thread, sometimes while a primitive's
/// internal mutex is held. Implementations must be quick and must not call
/// back into the primitive that emitted the event.
pub trait Observer: Send + Sync {
    fn observe(&self, event: &Event);
}

impl<F> Observer for F
where
    F: Fn(&Event) + Send + Sync,
{
    #[inline]
    fn observe(&self, event: &Event) {
        self(event)
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl Observer for NullObserver {
    #[inline]
    fn observe(&self, _event: &Event) {}
}
