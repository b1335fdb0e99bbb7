/*!
 * Process Types
 * Worker phases and the reports produced at shutdown
 */

use crate::core::types::WorkerId;
use crate::ipc::{QueueMessage, QueuePayload};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Worker state
///
/// One cycle walks the phases in declaration order; the stop flag is only
/// consulted after `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Variable-length setup before the rendezvous
    Preparing,
    /// Blocked until every participant has arrived
    AtBarrier,
    /// Queued for a permit from the resource pool
    AwaitingResource,
    /// Holding the treasure lock
    InCriticalSection,
    /// Message sent, returning the permit
    Publishing,
    /// Resting before the next cycle
    Idle,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Preparing,
        Phase::AtBarrier,
        Phase::AwaitingResource,
        Phase::InCriticalSection,
        Phase::Publishing,
        Phase::Idle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Preparing => "preparing",
            Phase::AtBarrier => "at_barrier",
            Phase::AwaitingResource => "awaiting_resource",
            Phase::InCriticalSection => "in_critical_section",
            Phase::Publishing => "publishing",
            Phase::Idle => "idle",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a worker ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum WorkerOutcome {
    /// Observed the stop flag after a full cycle
    Stopped,
    /// Work step returned an error
    Failed(String),
    /// Thread panicked
    Panicked(String),
}

/// Final state of one worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerReport {
    pub worker: WorkerId,
    /// Cycles completed through `Publishing`
    pub cycles: u64,
    pub outcome: WorkerOutcome,
}

impl WorkerReport {
    pub fn is_failure(&self) -> bool {
        !matches!(self.outcome, WorkerOutcome::Stopped)
    }
}

impl QueuePayload for WorkerReport {
    fn describe(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{} exited after {} cycle(s)", self.worker, self.cycles))
    }

    fn sender(&self) -> Option<&WorkerId> {
        Some(&self.worker)
    }
}

/// Everything `await_shutdown` collects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShutdownReport {
    /// Drained inbox, in send order
    pub messages: Vec<QueueMessage>,
    /// One report per worker, ordered by worker index
    pub workers: Vec<WorkerReport>,
}

impl ShutdownReport {
    /// Message bodies in send order
    pub fn bodies(&self) -> Vec<&str> {
        self.messages.iter().map(|m| m.body.as_str()).collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &WorkerReport> {
        self.workers.iter().filter(|r| r.is_failure())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display_matches_serde_name() {
        for phase in Phase::ALL {
            let json = serde_json::to_value(phase).unwrap();
            assert_eq!(json, phase.to_string());
        }
        assert_eq!(Phase::InCriticalSection.to_string(), "in_critical_section");
    }

    #[test]
    fn test_report_failures() {
        let report = ShutdownReport {
            messages: vec![],
            workers: vec![
                WorkerReport {
                    worker: WorkerId::with_prefix("W", 1),
                    cycles: 2,
                    outcome: WorkerOutcome::Stopped,
                },
                WorkerReport {
                    worker: WorkerId::with_prefix("W", 2),
                    cycles: 0,
                    outcome: WorkerOutcome::Failed("cave-in".into()),
                },
            ],
        };

        let failed: Vec<_> = report.failures().map(|r| r.worker.index).collect();
        assert_eq!(failed, vec![2]);
    }
}
