//! # LG-03 Peer Directory
//!
//! Known-peer set of a node.
//!
//! **Subsystem ID:** 03
//!
//! - Peers keyed by `host:port`; adds are idempotent, never overwrites
//! - Live-connection flags; disconnected peers stay listed for retry
//! - The local node's own descriptor, advertised in `PEERS` gossip
//! - Bounded size: adds past `max_peers` are dropped

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod service;

// Re-exports
pub use config::{DirectoryConfig, MAX_PEERS};
pub use domain::{DirectoryError, PeerDescriptor, PeerEntry};
pub use service::PeerDirectory;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
