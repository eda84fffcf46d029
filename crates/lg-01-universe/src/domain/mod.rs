//! # Domain Module
//!
//! Core domain types for the Universe: users, messages, birth certificates,
//! sequence bookkeeping and the aggregate itself.

pub mod entities;
pub mod errors;
pub mod identity;
pub mod invariants;
pub mod sequence;
pub mod universe;

pub use entities::*;
pub use errors::*;
pub use identity::*;
pub use invariants::*;
pub use sequence::*;
pub use universe::*;
