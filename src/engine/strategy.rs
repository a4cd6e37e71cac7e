//! Execution strategy selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a round's operations are executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Every operation runs to completion on the engine thread, one at a time.
    Sequential,
    /// Reads scan on a worker pool behind deferred results.
    #[default]
    Pooled,
    /// Reads suspend on a single-threaded scheduler while an auxiliary pool scans.
    Cooperative,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Sequential, Strategy::Pooled, Strategy::Cooperative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Pooled => "pooled",
            Self::Cooperative => "cooperative",
        }
    }

    /// Capitalized name for timing output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sequential => "Sequential",
            Self::Pooled => "Pooled",
            Self::Cooperative => "Cooperative",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown strategy: {0} (expected sequential, pooled or cooperative)")]
pub struct ParseStrategyError(pub String);

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "sync" => Ok(Self::Sequential),
            "pooled" | "pool" | "async" => Ok(Self::Pooled),
            "cooperative" | "coro" => Ok(Self::Cooperative),
            other => Err(ParseStrategyError(other.to_string())),
        }
    }
}
