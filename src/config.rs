//! Breaker configuration.
//!
//! Defaults applied by the registry when a breaker is created on first
//! lookup. Derives the Serde traits so applications can embed the block in
//! their own config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default cooldown before a tripped breaker reopens, in milliseconds.
pub const DEFAULT_RESET_MS: u64 = 60_000;

/// Default number of consecutive failures before tripping.
pub const DEFAULT_THRESHOLD: u32 = 5;

/// Configuration for breakers created by a registry.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Cooldown before a tripped breaker reopens, in milliseconds.
    pub reset_ms: u64,
    /// Consecutive failures required to trip.
    pub threshold: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            reset_ms: DEFAULT_RESET_MS,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl BreakerConfig {
    /// Create a configuration. A `threshold` of 0 is treated as 1.
    pub fn new(reset: Duration, threshold: u32) -> Self {
        Self {
            reset_ms: reset.as_millis() as u64,
            threshold: threshold.max(1),
        }
    }

    /// Cooldown as a `Duration`.
    pub fn reset(&self) -> Duration {
        Duration::from_millis(self.reset_ms)
    }
}
