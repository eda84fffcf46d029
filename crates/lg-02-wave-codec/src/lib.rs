//! # LG-02 Wave Codec
//!
//! Framing of protocol envelopes ("waves") over an ordered byte stream.
//!
//! **Subsystem ID:** 02
//!
//! ## Wire Format
//!
//! ```text
//! frame    = len:u32be || bincode(Envelope)
//! Envelope = { wave_id: [u8; 32], command: u16, payload: bytes }
//! ```
//!
//! | Command | Payload |
//! |---------|---------|
//! | `PING` / `PONG` | empty |
//! | `QUESTION` | `(topic: u16, args: [bytes])` |
//! | `ROOTS` | `[user bytes; 2]` |
//! | `PEERS` | `[descriptor bytes]` |
//! | `MESSAGES` | `[message bytes]` |
//! | `ERR` | error text; `wave_id` is the failed exchange |
//!
//! A frame that cannot be decoded is consumed and reported; only a clean
//! end-of-stream or a transport failure ends the stream.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;

// Re-exports
pub use adapters::{encode_frame, read_envelope, read_wave, write_wave, MAX_WAVE_BYTES};
pub use domain::{CodecError, Command, Envelope, Wave, WaveBody};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
