//! # Ports Module
//!
//! Outbound dependencies of the Universe (storage mirror).

pub mod outbound;

pub use outbound::*;
