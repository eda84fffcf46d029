//! Domain Errors for the Peer Directory

use thiserror::Error;

/// Peer directory errors.
///
/// `PeerAlreadyExists` and `SelfConnection` are expected outcomes of gossip;
/// callers treat them as non-fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// Address already known (adds never overwrite).
    #[error("Peer already exists: {0}")]
    PeerAlreadyExists(String),

    /// Attempted to add the local node.
    #[error("Cannot add local node to peer directory")]
    SelfConnection,

    /// Address not in the directory.
    #[error("Peer not found: {0}")]
    PeerNotFound(String),

    /// Directory at `max_peers`; the new address was dropped.
    #[error("Peer directory full ({capacity}), dropped {address}")]
    DirectoryFull {
        /// Dropped address
        address: String,
        /// Configured cap
        capacity: usize,
    },

    /// Descriptor cannot be parsed or decoded.
    #[error("Invalid peer descriptor: {0}")]
    InvalidDescriptor(String),
}

impl DirectoryError {
    /// Outcome of overlapping gossip rather than a failure.
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::PeerAlreadyExists(_) | Self::SelfConnection)
    }
}
