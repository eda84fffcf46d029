//! # Codec Errors

use shared_types::{hash_to_hex, Hash};
use thiserror::Error;

/// Wave codec errors.
///
/// `Closed` and `Io` end the connection; every other variant leaves the
/// stream positioned at the next frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Clean end-of-stream at a frame boundary.
    #[error("Stream closed")]
    Closed,

    /// Transport failure or end-of-stream inside a frame.
    #[error("I/O error: {0}")]
    Io(String),

    /// Frame length exceeds the limit; its bytes were skipped.
    #[error("Frame too large: {len} > {max} bytes")]
    FrameTooLarge {
        /// Declared frame length
        len: usize,
        /// Configured maximum
        max: usize,
    },

    /// Frame or payload could not be decoded.
    #[error("Malformed wave: {reason}")]
    Malformed {
        /// Envelope id, when the envelope itself decoded
        wave_id: Option<Hash>,
        /// Decoder message
        reason: String,
    },

    /// Envelope decoded but its command (or question topic) is unknown.
    #[error("Unsupported command {tag} in wave {}", hash_to_hex(.wave_id))]
    UnsupportedCommand {
        /// Envelope id
        wave_id: Hash,
        /// Raw tag
        tag: u16,
    },

    /// Outbound encoding failed.
    #[error("Encode error: {0}")]
    Encode(String),
}

impl CodecError {
    /// Whether the connection can no longer be read.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Closed | Self::Io(_))
    }

    /// Envelope id to correlate an `ERR` reply with, if known.
    pub fn wave_id(&self) -> Option<Hash> {
        match self {
            Self::Malformed { wave_id, .. } => *wave_id,
            Self::UnsupportedCommand { wave_id, .. } => Some(*wave_id),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
