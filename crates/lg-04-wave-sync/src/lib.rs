//! # Wave Sync (Subsystem 04)
//!
//! Turns a [`lg_01_universe::Ledger`] into a network node: answers inbound
//! waves on every connection and runs the periodic sync cycle over outbound
//! links.
//!
//! ## Architecture
//!
//! | Layer | Contents |
//! |-------|----------|
//! | `domain` | `NodeState`, `SyncError`, payload encoding |
//! | `ports` | `Dialer`, `WaveStream` |
//! | `adapters` | TCP and in-memory transports |
//! | `service` | `Node`, `PeerLink`, inbound dispatch, sync duties |
//!
//! ## Cycle
//!
//! 1. Dial every known peer that has no link.
//! 2. While bootstrapping, ask for `ROOTS` and install the first valid pair.
//! 3. Gossip `PEERS`, `PING` every link, page `MESSAGES` from each cursor.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{serve_tcp, MemoryDialer, MemoryNetwork, TcpDialer};
pub use config::{SyncConfig, MAX_MESSAGES_PER_WAVE, MAX_QUESTIONS_PER_CYCLE};
pub use domain::{NodeState, SyncError};
pub use ports::{BoxedStream, Dialer, WaveStream};
pub use service::{CycleReport, IngestReport, Node, PeerCursor, PeerLink};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
