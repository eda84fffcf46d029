//! # Universe Configuration

use serde::{Deserialize, Serialize};

/// Number of consecutive self-chain messages a user may author before a
/// space-time witness is needed to keep extending its recognized sequence.
pub const REPRODUCTION_INTERVAL: u64 = 1024;

/// Universe configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    /// Unwitnessed self-chain allowance, see [`REPRODUCTION_INTERVAL`].
    pub reproduction_interval: u64,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            reproduction_interval: REPRODUCTION_INTERVAL,
        }
    }
}

impl UniverseConfig {
    /// Create a config for testing (short interval so caps are reachable).
    pub fn for_testing() -> Self {
        Self {
            reproduction_interval: 8,
        }
    }
}
