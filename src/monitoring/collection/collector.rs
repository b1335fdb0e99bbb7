/*!
 * Unified Collector
 * Fans every event out to a set of observers
 */

use super::observer::Observer;
use crate::monitoring::events::{Event, Severity};
use std::sync::Arc;

/// Observer that forwards to several observers in registration order
#[derive(Clone, Default)]
pub struct Collector {
    observers: Vec<Arc<dyn Observer>>,
    min_severity: Option<Severity>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer
    pub fn with(mut self, observer: impl Observer + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    /// Drop events below `severity` before forwarding
    pub fn min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = Some(severity);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl Observer for Collector {
    fn observe(&self, event: &Event) {
        if let Some(min) = self.min_severity {
            if event.severity < min {
                return;
            }
        }
        for observer in &self.observers {
            observer.observe(event);
        }
    }
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("observers", &self.observers.len())
            .field("min_severity", &self.min_severity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::collection::EventLog;
    use crate::monitoring::events::Payload;

    #[test]
    fn test_collector_fans_out() {
        let first = EventLog::new();
        let second = EventLog::new();
        let collector = Collector::new().with(first.clone()).with(second.clone());

        collector.observe(&Event::new(Severity::Info, Payload::StopRequested));

        assert_eq!(collector.len(), 2);
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_collector_severity_filter() {
        let log = EventLog::new();
        let collector = Collector::new()
            .with(log.clone())
            .min_severity(Severity::Info);

        collector.observe(&Event::new(Severity::Debug, Payload::WorkerStarted));
        collector.observe(&Event::new(Severity::Warn, Payload::StopRequested));

        assert_eq!(log.len(), 1);
        assert_eq!(log.events()[0].payload, Payload::StopRequested);
    }
}
