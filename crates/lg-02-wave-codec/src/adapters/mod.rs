//! # Adapters Module
//!
//! Framing over tokio byte streams.

pub mod framing;

pub use framing::*;
