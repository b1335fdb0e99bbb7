/*!
 * Adventure Kernel - Main Entry Point
 *
 * Starts a party of workers with the configured pacing, narrates every
 * transition through tracing, and on Ctrl+C stops the party cooperatively
 * and prints every message left in the inbox.
 */

use adventure_kernel::{init_tracing, AdventureConfig, Coordinator, RandomDelay, TracingObserver};
use anyhow::Context;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// JSON config file to load before env overrides
const CONFIG_PATH_VAR: &str = "ADVENTURE_CONFIG";
/// Optional deadline for joining the workers after Ctrl+C
const SHUTDOWN_TIMEOUT_VAR: &str = "ADVENTURE_SHUTDOWN_TIMEOUT_SECS";

fn load_config() -> anyhow::Result<AdventureConfig> {
    let config = match std::env::var(CONFIG_PATH_VAR) {
        Ok(path) => {
            info!(path = %path, "loading config file");
            AdventureConfig::from_json_file(&path)
                .with_context(|| format!("failed to load {path}"))?
        }
        Err(_) => AdventureConfig::default(),
    };
    Ok(config.apply_env()?)
}

fn shutdown_timeout() -> anyhow::Result<Option<Duration>> {
    match std::env::var(SHUTDOWN_TIMEOUT_VAR) {
        Ok(raw) => {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{SHUTDOWN_TIMEOUT_VAR} must be whole seconds, got {raw:?}"))?;
            Ok(Some(Duration::from_secs(secs)))
        }
        Err(_) => Ok(None),
    }
}

/// Exit status for a run cut short by a second Ctrl+C
const ABORT_EXIT_CODE: i32 = 130;

/// Run `shutdown` to completion unless `abort` fires first
async fn unless_aborted<T>(
    shutdown: impl Future<Output = T>,
    abort: impl Future<Output = ()>,
) -> Option<T> {
    tokio::select! {
        result = shutdown => Some(result),
        _ = abort => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config()?;
    let timeout = shutdown_timeout()?;

    info!("Adventure starting...");
    info!("================================================");
    info!(
        workers = config.worker_count,
        permits = config.pool_capacity,
        "Assembling the party"
    );

    let mut coordinator = Coordinator::builder(config)
        .observer(TracingObserver)
        .delay(RandomDelay::new())
        .start()?;

    info!("Party on the road - press Ctrl+C to end the adventure");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    info!("Ctrl+C received, waiting for every character to finish");
    coordinator.request_stop();

    let joining = tokio::task::spawn_blocking(move || match timeout {
        Some(deadline) => coordinator.await_shutdown_timeout(deadline),
        None => coordinator.await_shutdown(),
    });
    let second_ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    let Some(joined) = unless_aborted(joining, second_ctrl_c).await else {
        warn!("second Ctrl+C received, abandoning the party");
        std::process::exit(ABORT_EXIT_CODE);
    };
    let report = joined??;

    info!("================================================");
    for message in &report.messages {
        info!(worker = %message.sender, cycle = message.cycle, "{}", message.body);
    }
    for failed in report.failures() {
        warn!(worker = %failed.worker, outcome = ?failed.outcome, "worker ended early");
    }
    info!(messages = report.messages.len(), "All adventures are complete");

    Ok(())
}
