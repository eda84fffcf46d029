//! Crypto error types.

use thiserror::Error;

/// Identity capability errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// No engine is registered for the `source` tag, or the `sig_type` tag is unknown.
    #[error("Scheme unsupported: source={engine}, type={sig_type}")]
    SchemeUnsupported {
        /// Declared engine (`source`) tag
        engine: String,
        /// Declared signature shape tag
        sig_type: String,
    },

    /// Key material does not fit the declared scheme or shape.
    #[error("Key mismatch: {0}")]
    KeyMismatch(String),

    /// Signature or key bytes cannot be decoded.
    #[error("Malformed input: {0}")]
    Malformed(String),

    /// Signature tags disagree with the public key tags.
    #[error("Scheme mismatch: signature is {signature}, key is {key}")]
    SchemeMismatch {
        /// `source/type` of the signature
        signature: String,
        /// `source/type` of the public key
        key: String,
    },
}
