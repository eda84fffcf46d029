//! # Shared Types Crate
//!
//! Identifiers used across every Lineage subsystem.
//!
//! ## Design Principles
//!
//! - **Content addressing**: every user and message id is a [`Hash`] derived
//!   from the canonical bytes of the entity, never generated at random.
//! - **Correlation only**: [`random_hash`] exists for protocol correlation
//!   tokens (wave ids) and nothing else.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
