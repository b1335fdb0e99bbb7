/*!
 * Party Configuration
 *
 * Defaults come from `core::limits`. Overrides can be layered from a JSON
 * file and from environment variables:
 * - ADVENTURE_WORKERS: number of concurrent workers
 * - ADVENTURE_POOL: concurrent critical-section admissions
 * - ADVENTURE_NAME_PREFIX: worker name prefix
 */

use crate::core::errors::{ConfigError, ConfigResult};
use crate::core::limits::{
    COLLECT_DELAY_MAX, COLLECT_DELAY_MIN, DEFAULT_NAME_PREFIX, DEFAULT_POOL_CAPACITY,
    DEFAULT_WORKER_COUNT, IDLE_DELAY_MAX, IDLE_DELAY_MIN, MIN_WORKER_COUNT, PREPARE_DELAY_MAX,
    PREPARE_DELAY_MIN,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Inclusive pacing range, serialized in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    #[serde(rename = "min_ms", with = "duration_ms")]
    pub min: Duration,
    #[serde(rename = "max_ms", with = "duration_ms")]
    pub max: Duration,
}

impl DelayRange {
    pub const fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub const ZERO: DelayRange = DelayRange::new(Duration::ZERO, Duration::ZERO);

    fn validate(&self, phase: &'static str) -> ConfigResult<()> {
        if self.min > self.max {
            return Err(ConfigError::InvalidDelayRange {
                phase,
                min_ms: self.min.as_millis() as u64,
                max_ms: self.max.as_millis() as u64,
            });
        }
        Ok(())
    }
}

/// Pacing for each delayed phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseTimings {
    pub prepare: DelayRange,
    pub collect: DelayRange,
    pub idle: DelayRange,
}

impl PhaseTimings {
    /// No pacing at all
    pub const fn instant() -> Self {
        Self {
            prepare: DelayRange::ZERO,
            collect: DelayRange::ZERO,
            idle: DelayRange::ZERO,
        }
    }
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self {
            prepare: DelayRange::new(PREPARE_DELAY_MIN, PREPARE_DELAY_MAX),
            collect: DelayRange::new(COLLECT_DELAY_MIN, COLLECT_DELAY_MAX),
            idle: DelayRange::new(IDLE_DELAY_MIN, IDLE_DELAY_MAX),
        }
    }
}

/// Party configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdventureConfig {
    /// Concurrent workers; also the barrier capacity
    pub worker_count: usize,
    /// Permits in the resource pool
    pub pool_capacity: usize,
    /// Workers are named `{name_prefix}{index}`
    pub name_prefix: String,
    pub timings: PhaseTimings,
}

impl Default for AdventureConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            pool_capacity: DEFAULT_POOL_CAPACITY,
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            timings: PhaseTimings::default(),
        }
    }
}

impl AdventureConfig {
    /// Default party with pacing disabled
    pub fn instant() -> Self {
        Self {
            timings: PhaseTimings::instant(),
            ..Self::default()
        }
    }

    pub fn with_workers(mut self, worker_count: usize, pool_capacity: usize) -> Self {
        self.worker_count = worker_count;
        self.pool_capacity = pool_capacity;
        self
    }

    pub fn with_timings(mut self, timings: PhaseTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Check the invariants the coordinator relies on
    pub fn validate(&self) -> ConfigResult<()> {
        if self.worker_count < MIN_WORKER_COUNT {
            return Err(ConfigError::InvalidWorkerCount(self.worker_count));
        }
        if self.pool_capacity == 0 {
            return Err(ConfigError::InvalidPoolCapacity(self.pool_capacity));
        }
        if self.pool_capacity >= self.worker_count {
            return Err(ConfigError::PoolNotContended {
                worker_count: self.worker_count,
                pool_capacity: self.pool_capacity,
            });
        }
        self.timings.prepare.validate("prepare")?;
        self.timings.collect.validate("collect")?;
        self.timings.idle.validate("idle")?;
        Ok(())
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> ConfigResult<Self> {
        Self::default().apply_env()
    }

    /// Apply environment overrides on top of `self`
    pub fn apply_env(self) -> ConfigResult<Self> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("ADVENTURE_WORKERS") {
            self.worker_count = parse_count("ADVENTURE_WORKERS", value)?;
        }
        if let Some(value) = lookup("ADVENTURE_POOL") {
            self.pool_capacity = parse_count("ADVENTURE_POOL", value)?;
        }
        if let Some(value) = lookup("ADVENTURE_NAME_PREFIX") {
            self.name_prefix = value;
        }
        Ok(self)
    }

    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

fn parse_count(var: &'static str, value: String) -> ConfigResult<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { var, value })
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
