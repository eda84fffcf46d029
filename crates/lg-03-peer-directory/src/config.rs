//! Peer Directory configuration.

use serde::{Deserialize, Serialize};

/// Default cap on known peers.
pub const MAX_PEERS: usize = 1024;

/// Directory limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Known-peer cap. Adds beyond it are dropped (tail drop).
    pub max_peers: usize,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            max_peers: MAX_PEERS,
        }
    }
}

impl DirectoryConfig {
    /// Small table for tests.
    pub fn for_testing() -> Self {
        Self { max_peers: 8 }
    }
}
