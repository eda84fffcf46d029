//! # Node Configuration
//!
//! Layered: built-in defaults, then an optional TOML file named by
//! `LG_CONFIG`, then environment overrides.
//!
//! ```toml
//! log_level = "debug"
//!
//! [network]
//! listen_addr = "0.0.0.0:7700"
//! advertise_host = "203.0.113.7"
//! bootstrap = ["198.51.100.1:7700"]
//!
//! [directory]
//! max_peers = 1024
//!
//! [universe]
//! reproduction_interval = 1024
//!
//! [sync]
//! sync_interval_secs = 10
//!
//! [genesis]
//! create = true
//! source = "ed25519"
//! sig_type = "single-key"
//! names = ["adam", "eve"]
//! seeds = [["<64 hex chars>"], ["<64 hex chars>"]]
//! ```

use lg_01_universe::UniverseConfig;
use lg_03_peer_directory::{DirectoryConfig, DirectoryError, PeerDescriptor};
use lg_04_wave_sync::SyncConfig;
use serde::{Deserialize, Serialize};
use shared_crypto::{ED25519_SOURCE, SINGLE_KEY};
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Path of the TOML config file.
pub const ENV_CONFIG: &str = "LG_CONFIG";
/// Overrides `network.listen_addr`.
pub const ENV_LISTEN_ADDR: &str = "LG_LISTEN_ADDR";
/// Overrides `network.advertise_host`.
pub const ENV_ADVERTISE_HOST: &str = "LG_ADVERTISE_HOST";
/// Comma-separated `host:port` list replacing `network.bootstrap`.
pub const ENV_BOOTSTRAP: &str = "LG_BOOTSTRAP";
/// Overrides `log_level`.
pub const ENV_LOG_LEVEL: &str = "LG_LOG_LEVEL";

const LOOPBACK: &str = "127.0.0.1";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file unreadable.
    #[error("Cannot read {path}: {reason}")]
    Read {
        /// File path
        path: String,
        /// OS error
        reason: String,
    },

    /// Config file is not valid TOML for [`NodeConfig`].
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Environment override has the wrong shape.
    #[error("Invalid {key}: {reason}")]
    InvalidEnv {
        /// Variable name
        key: &'static str,
        /// What was wrong
        reason: String,
    },

    /// Bootstrap entry is not `host:port`.
    #[error("Invalid bootstrap peer: {0}")]
    InvalidBootstrap(#[from] DirectoryError),
}

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// `tracing` max level name.
    pub log_level: String,
    /// Listener and peers.
    pub network: NetworkConfig,
    /// Peer table limits.
    pub directory: DirectoryConfig,
    /// Universe parameters.
    pub universe: UniverseConfig,
    /// Sync engine parameters.
    pub sync: SyncConfig,
    /// Local genesis creation.
    pub genesis: GenesisConfig,
}

/// Network configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// TCP listen address.
    pub listen_addr: SocketAddr,
    /// Host gossiped to peers. Defaults to the listen IP.
    pub advertise_host: Option<String>,
    /// Initial peers, `host:port`.
    pub bootstrap: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 7700)),
            advertise_host: None,
            bootstrap: Vec::new(),
        }
    }
}

impl NetworkConfig {
    /// Descriptor gossiped for this node once bound to `bound`.
    /// A wildcard bind without `advertise_host` advertises loopback.
    pub fn advertised(&self, bound: SocketAddr) -> PeerDescriptor {
        let host = self.advertise_host.clone().unwrap_or_else(|| {
            if bound.ip().is_unspecified() {
                LOOPBACK.to_string()
            } else {
                bound.ip().to_string()
            }
        });
        PeerDescriptor::new(host, bound.port())
    }

    /// Parsed bootstrap list.
    pub fn bootstrap_peers(&self) -> Result<Vec<PeerDescriptor>, ConfigError> {
        self.bootstrap
            .iter()
            .map(|entry| entry.parse().map_err(ConfigError::from))
            .collect()
    }
}

/// Genesis creation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisConfig {
    /// Create the root pair locally instead of fetching it from peers.
    pub create: bool,
    /// Identity engine.
    pub source: String,
    /// Key shape.
    pub sig_type: String,
    /// Sub-keys per root when generating fresh seeds.
    pub key_count: usize,
    /// Root names.
    pub names: [String; 2],
    /// Hex seeds per root, one per sub-key. Empty generates fresh ones.
    pub seeds: Vec<Vec<String>>,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            create: false,
            source: ED25519_SOURCE.to_string(),
            sig_type: SINGLE_KEY.to_string(),
            key_count: 1,
            names: ["adam".to_string(), "eve".to_string()],
            seeds: Vec::new(),
        }
    }
}

impl NodeConfig {
    /// Defaults, overlaid with `LG_CONFIG` and environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(ENV_CONFIG) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&text)
    }

    /// Parse TOML text. Missing keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `LG_*` overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(addr) = lookup(ENV_LISTEN_ADDR) {
            self.network.listen_addr = addr.parse().map_err(|e| ConfigError::InvalidEnv {
                key: ENV_LISTEN_ADDR,
                reason: format!("{e}"),
            })?;
        }
        if let Some(host) = lookup(ENV_ADVERTISE_HOST) {
            self.network.advertise_host = Some(host);
        }
        if let Some(list) = lookup(ENV_BOOTSTRAP) {
            self.network.bootstrap = list
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(String::from)
                .collect();
            self.network.bootstrap_peers()?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        Ok(())
    }

    /// Max log level, `INFO` when unset or unrecognized.
    pub fn max_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}
