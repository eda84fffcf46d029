//! # Domain Errors
//!
//! Validation failures are always raised before any mutation.

use shared_crypto::CryptoError;
use shared_types::{hash_to_hex, Hash};
use thiserror::Error;

/// Universe error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UniverseError {
    /// Genesis users are not two parentless users of opposite gender.
    #[error("Invalid root pair: {0}")]
    InvalidRootPair(String),

    /// Roots were already installed with a different pair.
    #[error("Universe already initialized with different roots")]
    AlreadyInitialized,

    /// No roots yet; nothing can be admitted.
    #[error("Universe not initialized")]
    NotInitialized,

    /// Message author is not a known user.
    #[error("Sender unknown: {}", hash_to_hex(.0))]
    SenderUnknown(Hash),

    /// Claimed message id does not match its content.
    #[error("Message id mismatch: claimed {}, computed {}", hash_to_hex(.claimed), hash_to_hex(.computed))]
    InvalidMessageId {
        /// Id carried by the message
        claimed: Hash,
        /// Id derived from the message content
        computed: Hash,
    },

    /// Message id already admitted.
    #[error("Duplicate message: {}", hash_to_hex(.0))]
    DuplicateMessage(Hash),

    /// A reference names a message that is not admitted (or names it under the wrong sender).
    #[error("Unknown reference: {}", hash_to_hex(.0))]
    UnknownReference(Hash),

    /// Message signature missing or not valid for the sender's key.
    #[error("Bad signature: {0}")]
    BadSignature(String),

    /// Birth payload fails parent, gender or signature checks.
    #[error("Invalid birth content: {0}")]
    InvalidBirthContent(String),

    /// Witness target is not an admitted message.
    #[error("Message unknown: {}", hash_to_hex(.0))]
    MessageUnknown(Hash),

    /// Canonical serialization failed.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Local signing failed.
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Storage mirror failed; the universe was not changed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl UniverseError {
    /// Expected outcome of overlapping gossip, not a failure.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateMessage(_))
    }
}

/// Storage collaborator errors. Absence is reported as `Ok(None)`, not here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Backend I/O failure.
    #[error("Storage backend failure: {0}")]
    Backend(String),

    /// Stored data is inconsistent.
    #[error("Storage corrupted: {0}")]
    Corrupted(String),
}
