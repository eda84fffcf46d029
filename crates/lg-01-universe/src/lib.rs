//! # LG-01 Universe
//!
//! In-memory DAG of users and messages.
//!
//! **Subsystem ID:** 01
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Admit messages through one validated path (sender, id, duplicate,
//!   references, signature, birth)
//! - Create non-root users only through two-parent birth certificates
//! - Track per-user sequence numbers and space-time witness credit
//!
//! ## Module Structure
//!
//! ```text
//! lg-01-universe/
//! ├── domain/     # User, Message, BirthContent, SequenceBook, Universe, errors
//! ├── ports/      # UniverseStore (outbound) + in-memory adapter
//! ├── service/    # Ledger (shared admission path), genesis helpers
//! └── config.rs   # UniverseConfig, REPRODUCTION_INTERVAL
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use config::{UniverseConfig, REPRODUCTION_INTERVAL};
pub use domain::{
    derive_gender, Admission, BirthContent, Gender, Message, MessageId, MessageValue,
    ParentSignature, Reference, SequenceState, StoreError, Universe, UniverseError, User, UserId,
    UserInfo,
};
pub use ports::{InMemoryUniverseStore, UniverseStore};
pub use service::{generate_root_pair, Ledger, RootIdentity};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
