/*!
 * Coordinator Integration Tests
 *
 * Full party runs with instant pacing: message collection, cooperative
 * stop, failing and panicking workers, and shutdown deadlines.
 */

use adventure_kernel::core::sync::CountingSemaphore;
use adventure_kernel::ipc::BlockingQueue;
use adventure_kernel::{
    AdventureConfig, Collector, ConfigError, Coordinator, CoordinatorError, Event, EventLog,
    FixedDelay, NoDelay, Payload, Phase, StopFlag, WorkError, WorkerId, WorkerOutcome,
};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(10);

fn instant(workers: usize, pool: usize) -> AdventureConfig {
    AdventureConfig::instant().with_workers(workers, pool)
}

/// Event log plus an observer that raises `stop` on the first event
fn stop_on_first_event(log: &EventLog, stop: &StopFlag) -> Collector {
    let trigger = stop.clone();
    Collector::new()
        .with(log.clone())
        .with(move |_: &Event| {
            trigger.raise();
        })
}

fn sent_messages(log: &EventLog) -> Vec<String> {
    log.events()
        .into_iter()
        .filter_map(|e| match e.payload {
            Payload::MessageSent { message } => Some(message),
            _ => None,
        })
        .collect()
}

#[test]
fn test_one_cycle_per_worker_collects_every_message_once() {
    let log = EventLog::new();
    let stop = StopFlag::new();
    let mut coordinator = Coordinator::builder(instant(4, 2))
        .delay(NoDelay)
        .observer(stop_on_first_event(&log, &stop))
        .stop_flag(stop)
        .start()
        .unwrap();

    let report = coordinator.await_shutdown().unwrap();

    let seqs: Vec<u64> = report.messages.iter().map(|m| m.seq).collect();
    assert_eq!(seqs, vec![1, 2, 3, 4]);

    let mut bodies: Vec<&str> = report.bodies();
    assert_eq!(bodies.len(), 4);
    // Send order as seen by the queue itself
    assert_eq!(
        bodies.iter().map(|b| b.to_string()).collect::<Vec<_>>(),
        sent_messages(&log)
    );
    bodies.sort_unstable();
    assert_eq!(
        bodies,
        vec![
            "W1 collected a treasure!",
            "W2 collected a treasure!",
            "W3 collected a treasure!",
            "W4 collected a treasure!",
        ]
    );

    for (index, worker) in report.workers.iter().enumerate() {
        assert_eq!(worker.worker.index, index + 1);
        assert_eq!(worker.cycles, 1);
        assert_eq!(worker.outcome, WorkerOutcome::Stopped);
    }
    assert!(coordinator.shared().inbox.is_empty());
    assert_eq!(coordinator.shared().pool.available_permits(), 2);
}

#[test]
fn test_phases_follow_the_cycle_for_every_worker() {
    let log = EventLog::new();
    let mut coordinator = Coordinator::builder(instant(3, 1))
        .delay(NoDelay)
        .observer(log.clone())
        .start()
        .unwrap();

    assert!(log.wait_until(WAIT, |events| {
        events
            .iter()
            .filter(|e| e.entered_phase() == Some(Phase::Idle))
            .count()
            >= 6
    }));
    let report = coordinator.shutdown().unwrap();

    let mut phases: HashMap<WorkerId, Vec<Phase>> = HashMap::new();
    for event in log.events() {
        if let (Some(worker), Some(phase)) = (event.worker.clone(), event.entered_phase()) {
            phases.entry(worker).or_default().push(phase);
        }
    }

    for worker in &report.workers {
        let seen = &phases[&worker.worker];
        assert_eq!(seen.len() as u64, worker.cycles * Phase::ALL.len() as u64);
        let expected: Vec<Phase> = Phase::ALL.iter().copied().cycle().take(seen.len()).collect();
        assert_eq!(seen, &expected);
    }

    let total_cycles: u64 = report.workers.iter().map(|w| w.cycles).sum();
    assert_eq!(report.messages.len() as u64, total_cycles);
}

#[test]
fn test_stop_during_critical_section_completes_the_cycle() {
    let log = EventLog::new();
    let entered = Arc::new(BlockingQueue::<String>::new());
    let gate = Arc::new(CountingSemaphore::new(0));

    let work = {
        let entered = entered.clone();
        let gate = gate.clone();
        move |worker: &WorkerId, _cycle: u64| -> Result<String, WorkError> {
            entered.send(worker.name.clone());
            gate.acquire().forget();
            Ok(format!("{} collected a treasure!", worker.name))
        }
    };

    let mut coordinator = Coordinator::builder(instant(2, 1))
        .delay(NoDelay)
        .work(work)
        .observer(log.clone())
        .start()
        .unwrap();

    let first = entered.receive_timeout(WAIT).unwrap();
    assert!(coordinator.shared().treasure.is_held());
    coordinator.request_stop();

    // Let both workers finish their critical sections
    gate.release();
    gate.release();
    let report = coordinator.await_shutdown().unwrap();

    assert_eq!(report.messages.len(), 2);
    assert_eq!(report.messages[0].sender.name, first);
    assert!(report.workers.iter().all(|w| w.cycles == 1));
    assert!(!coordinator.shared().treasure.is_held());
    assert_eq!(coordinator.shared().pool.available_permits(), 1);

    // The interrupted worker still published after the stop request
    let events = log.events();
    let stop_at = events
        .iter()
        .position(|e| e.payload == Payload::StopRequested)
        .unwrap();
    let published_after_stop = events[stop_at..].iter().any(|e| {
        e.entered_phase() == Some(Phase::Publishing)
            && e.worker.as_ref().map(|w| w.name.as_str()) == Some(first.as_str())
    });
    assert!(published_after_stop);
}

#[test]
fn test_failing_worker_does_not_stop_its_peers() {
    let log = EventLog::new();
    let work = |worker: &WorkerId, _cycle: u64| -> Result<String, WorkError> {
        if worker.index == 2 {
            Err(WorkError::Failed("cave-in".into()))
        } else {
            Ok(format!("{} collected a treasure!", worker.name))
        }
    };

    let mut coordinator = Coordinator::builder(instant(3, 2))
        .delay(FixedDelay(Duration::from_millis(1)))
        .work(work)
        .observer(log.clone())
        .start()
        .unwrap();

    // Survivors keep passing the barrier without the failed worker
    assert!(log.wait_until(WAIT, |events| {
        events
            .iter()
            .filter(|e| matches!(e.payload, Payload::BarrierReleased { .. }))
            .count()
            >= 3
    }));
    let report = coordinator.shutdown().unwrap();

    let failed: Vec<_> = report.failures().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].worker.index, 2);
    assert_eq!(failed[0].cycles, 0);
    assert_eq!(
        failed[0].outcome,
        WorkerOutcome::Failed("Work failed: cave-in".into())
    );

    assert!(report.messages.iter().all(|m| m.sender.index != 2));
    assert!(report.workers[0].cycles >= 2);
    assert!(report.workers[2].cycles >= 2);
    assert!(!coordinator.shared().treasure.is_held());
    assert_eq!(coordinator.shared().pool.available_permits(), 2);
}

#[test]
fn test_panicking_worker_is_reported() {
    let work = |worker: &WorkerId, _cycle: u64| -> Result<String, WorkError> {
        if worker.index == 1 {
            panic!("trap door");
        }
        Ok(format!("{} collected a treasure!", worker.name))
    };
    let log = EventLog::new();
    let stop = StopFlag::new();

    let mut coordinator = Coordinator::builder(instant(2, 1))
        .delay(NoDelay)
        .work(work)
        .observer(stop_on_first_event(&log, &stop))
        .stop_flag(stop)
        .start()
        .unwrap();

    let report = coordinator.await_shutdown().unwrap();

    assert_eq!(
        report.workers[0].outcome,
        WorkerOutcome::Panicked("trap door".into())
    );
    assert_eq!(report.workers[1].outcome, WorkerOutcome::Stopped);
    assert_eq!(report.bodies(), vec!["W2 collected a treasure!"]);
    assert!(!coordinator.shared().treasure.is_held());
}

#[test]
fn test_shutdown_deadline_can_be_retried() {
    let gate = Arc::new(CountingSemaphore::new(0));
    let work = {
        let gate = gate.clone();
        move |worker: &WorkerId, _cycle: u64| -> Result<String, WorkError> {
            gate.acquire().forget();
            Ok(format!("{} collected a treasure!", worker.name))
        }
    };

    let mut coordinator = Coordinator::builder(instant(2, 1))
        .delay(NoDelay)
        .work(work)
        .start()
        .unwrap();
    coordinator.request_stop();

    let result = coordinator.await_shutdown_timeout(Duration::from_millis(50));
    assert!(matches!(
        result,
        Err(CoordinatorError::ShutdownTimeout { pending: 2 })
    ));

    gate.release();
    gate.release();
    let report = coordinator.await_shutdown_timeout(WAIT).unwrap();
    assert_eq!(report.messages.len(), 2);
    assert_eq!(coordinator.pending_workers(), 0);

    assert!(matches!(
        coordinator.await_shutdown_timeout(WAIT),
        Err(CoordinatorError::AlreadyShutDown)
    ));
}

#[test]
fn test_party_too_small_is_rejected() {
    let result = Coordinator::builder(instant(1, 1)).delay(NoDelay).start();
    assert!(matches!(
        result,
        Err(CoordinatorError::Config(ConfigError::InvalidWorkerCount(1)))
    ));
}

#[test]
fn test_custom_name_prefix() {
    let log = EventLog::new();
    let stop = StopFlag::new();
    let mut config = instant(2, 1);
    config.name_prefix = "Knight".into();

    let mut coordinator = Coordinator::builder(config)
        .delay(NoDelay)
        .observer(stop_on_first_event(&log, &stop))
        .stop_flag(stop)
        .start()
        .unwrap();

    let report = coordinator.await_shutdown().unwrap();
    let mut bodies = report.bodies();
    bodies.sort_unstable();
    assert_eq!(
        bodies,
        vec!["Knight1 collected a treasure!", "Knight2 collected a treasure!"]
    );
}

#[test]
fn test_observer_panic_on_exit_does_not_hang_shutdown() {
    let observer = |event: &Event| {
        if matches!(event.payload, Payload::WorkerExited { .. }) {
            panic!("narrator lost the plot");
        }
    };
    let stop = StopFlag::new();
    stop.raise();

    let mut coordinator = Coordinator::builder(instant(2, 1))
        .delay(NoDelay)
        .observer(observer)
        .stop_flag(stop)
        .start()
        .unwrap();

    let report = coordinator.await_shutdown_timeout(WAIT).unwrap();

    assert_eq!(report.workers.len(), 2);
    for worker in &report.workers {
        assert_eq!(worker.cycles, 1);
        assert_eq!(worker.outcome, WorkerOutcome::Stopped);
    }
    assert_eq!(report.messages.len(), 2);
}

#[test]
fn test_observer_panic_on_start_releases_the_barrier() {
    let observer = |event: &Event| {
        let first = event.worker.as_ref().map_or(false, |w| w.index == 1);
        if first && event.payload == Payload::WorkerStarted {
            panic!("narrator lost the plot");
        }
    };
    let stop = StopFlag::new();
    stop.raise();

    let mut coordinator = Coordinator::builder(instant(2, 1))
        .delay(NoDelay)
        .observer(observer)
        .stop_flag(stop)
        .start()
        .unwrap();

    let report = coordinator.await_shutdown_timeout(WAIT).unwrap();

    assert_eq!(
        report.workers[0].outcome,
        WorkerOutcome::Panicked("narrator lost the plot".into())
    );
    assert_eq!(report.workers[0].cycles, 0);
    assert_eq!(report.workers[1].outcome, WorkerOutcome::Stopped);
    assert_eq!(report.bodies(), vec!["W2 collected a treasure!"]);
}
