//! # Lineage Node Runtime
//!
//! Process bootstrap for a ledger node.
//!
//! - `config` - layered [`NodeConfig`] (defaults, TOML, `LG_*` environment)
//! - `genesis` - root pair creation from configured or fresh seeds
//! - `runtime` - [`NodeRuntime`]: listener, sync ticker, shutdown

pub mod config;
pub mod genesis;
pub mod runtime;

pub use config::{ConfigError, GenesisConfig, NetworkConfig, NodeConfig};
pub use genesis::{build_root_pair, GenesisError};
pub use runtime::NodeRuntime;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
