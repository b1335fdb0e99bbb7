/*!
 * Core Types
 * Common types used across the kernel
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonic timestamp in nanoseconds since the first event
pub type Timestamp = u64;

/// Worker identity
///
/// `index` is 1-based and stable for the lifetime of a party; `name` is what
/// shows up in messages and logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerId {
    pub index: usize,
    pub name: String,
}

impl WorkerId {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }

    /// Build the id for the `index`-th worker of a party
    pub fn with_prefix(prefix: &str, index: usize) -> Self {
        Self::new(index, format!("{prefix}{index}"))
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_id_with_prefix() {
        let id = WorkerId::with_prefix("W", 3);
        assert_eq!(id.index, 3);
        assert_eq!(id.to_string(), "W3");
    }
}
