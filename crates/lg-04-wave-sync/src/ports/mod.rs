//! Ports for the synchronization engine.

pub mod outbound;

pub use outbound::{BoxedStream, Dialer, WaveStream};
