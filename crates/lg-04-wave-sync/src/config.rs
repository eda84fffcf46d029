//! # Sync Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Messages returned per `MESSAGES` answer.
pub const MAX_MESSAGES_PER_WAVE: usize = 64;

/// `QUESTION(MESSAGES)` round-trips per peer per cycle.
pub const MAX_QUESTIONS_PER_CYCLE: usize = 30;

/// Synchronization engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Batch size of a `MESSAGES` answer.
    pub max_messages_per_wave: usize,

    /// Backfill round-trips per peer per cycle.
    pub max_questions_per_cycle: usize,

    /// Wait for a correlated reply, in milliseconds.
    pub exchange_timeout_ms: u64,

    /// Wait for an outbound connection, in milliseconds.
    pub dial_timeout_ms: u64,

    /// Seconds between sync cycles.
    pub sync_interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_messages_per_wave: MAX_MESSAGES_PER_WAVE,
            max_questions_per_cycle: MAX_QUESTIONS_PER_CYCLE,
            exchange_timeout_ms: 5_000,
            dial_timeout_ms: 3_000,
            sync_interval_secs: 10,
        }
    }
}

impl SyncConfig {
    /// Create a config for testing (small batches, short timeouts).
    pub fn for_testing() -> Self {
        Self {
            max_messages_per_wave: 4,
            max_questions_per_cycle: 30,
            exchange_timeout_ms: 500,
            dial_timeout_ms: 500,
            sync_interval_secs: 1,
        }
    }

    /// Reply deadline.
    pub fn exchange_timeout(&self) -> Duration {
        Duration::from_millis(self.exchange_timeout_ms)
    }

    /// Dial deadline.
    pub fn dial_timeout(&self) -> Duration {
        Duration::from_millis(self.dial_timeout_ms)
    }

    /// Cycle period.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }
}
