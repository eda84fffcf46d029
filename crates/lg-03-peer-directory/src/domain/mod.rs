//! Domain types for the Peer Directory.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
