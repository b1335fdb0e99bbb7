/*!
 * Event Log
 * In-memory recorder, mostly for inspecting a run after the fact
 */

use super::observer::Observer;
use crate::monitoring::events::Event;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Default)]
struct LogInner {
    events: Mutex<Vec<Event>>,
    appended: Condvar,
}

/// Records every event in arrival order; clones share the same log
#[derive(Clone, Default)]
pub struct EventLog {
    inner: Arc<LogInner>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<Event> {
        self.inner.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.events.lock().is_empty()
    }

    /// Block until `predicate` holds for the recorded events or `timeout` elapses
    ///
    /// Returns whether the predicate was satisfied.
    pub fn wait_until<F>(&self, timeout: Duration, mut predicate: F) -> bool
    where
        F: FnMut(&[Event]) -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut events = self.inner.events.lock();
        loop {
            if predicate(&events) {
                return true;
            }
            if self
                .inner
                .appended
                .wait_until(&mut events, deadline)
                .timed_out()
            {
                return predicate(&events);
            }
        }
    }
}

impl Observer for EventLog {
    fn observe(&self, event: &Event) {
        self.inner.events.lock().push(event.clone());
        self.inner.appended.notify_all();
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog").field("len", &self.len()).finish()
    }
}
