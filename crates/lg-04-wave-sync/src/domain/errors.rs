//! # Sync Errors

use lg_01_universe::UniverseError;
use lg_02_wave_codec::{CodecError, Command};
use lg_03_peer_directory::DirectoryError;
use thiserror::Error;

/// Synchronization engine errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Roots are not installed yet.
    #[error("Universe not initialized")]
    NotReady,

    /// Wire-level failure.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Admission or lookup failure.
    #[error("Universe error: {0}")]
    Universe(#[from] UniverseError),

    /// Peer directory failure.
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Payload bytes could not be decoded.
    #[error("Payload decode error: {0}")]
    Decode(String),

    /// Payload could not be encoded.
    #[error("Payload encode error: {0}")]
    Encode(String),

    /// No reply within the exchange deadline.
    #[error("Timeout waiting for {command} reply from {peer}")]
    Timeout {
        /// Peer address
        peer: String,
        /// Command that was sent
        command: Command,
    },

    /// Outbound connection failed.
    #[error("Dial {peer} failed: {reason}")]
    Dial {
        /// Peer address
        peer: String,
        /// Transport message
        reason: String,
    },

    /// Reply of the wrong kind.
    #[error("Unexpected {got} reply from {peer}, expected {expected}")]
    UnexpectedReply {
        /// Peer address
        peer: String,
        /// Command expected
        expected: Command,
        /// Command received
        got: Command,
    },

    /// Peer answered with `ERR`.
    #[error("Peer {peer} reported: {error}")]
    Remote {
        /// Peer address
        peer: String,
        /// Peer's error text
        error: String,
    },

    /// Inbound batch contained messages that failed admission.
    #[error("Rejected {rejected} of {total} messages")]
    BatchRejected {
        /// Messages that failed for reasons other than duplication
        rejected: usize,
        /// Messages in the batch
        total: usize,
    },

    /// Question topic this node does not answer.
    #[error("Unsupported question topic {0}")]
    UnsupportedTopic(Command),
}

impl SyncError {
    /// Whether the link the error came from should be dropped.
    pub fn breaks_link(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Dial { .. } => true,
            Self::Codec(e) => e.is_fatal(),
            _ => false,
        }
    }
}
