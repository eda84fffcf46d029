//! Peer directory service.

pub mod directory;

pub use directory::*;
