//! # Tagged Key Material
//!
//! Keys and signatures are envelopes: a `source` tag naming the engine, a
//! `sig_type` tag naming the shape, and one byte string per sub-key.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Shape tag: exactly one sub-key.
pub const SINGLE_KEY: &str = "single-key";

/// Shape tag: one or more sub-keys, every one of which must co-sign.
pub const MULTI_KEY: &str = "multi-key";

/// Public identity of a user.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey {
    /// Engine tag (e.g. `ed25519`).
    pub source: String,
    /// Shape tag (`single-key` / `multi-key`).
    pub sig_type: String,
    /// Encoded public sub-keys.
    pub keys: Vec<Vec<u8>>,
}

impl PublicKey {
    /// `source/sig_type` label used in errors and logs.
    pub fn scheme_label(&self) -> String {
        format!("{}/{}", self.source, self.sig_type)
    }
}

/// Secret material matching a [`PublicKey`]. Zeroized on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    /// Engine tag.
    pub source: String,
    /// Shape tag.
    pub sig_type: String,
    /// Encoded secret sub-keys.
    pub keys: Vec<Vec<u8>>,
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("source", &self.source)
            .field("sig_type", &self.sig_type)
            .field("keys", &format_args!("<{} redacted>", self.keys.len()))
            .finish()
    }
}

/// Signature produced by a [`PrivateKey`]; one entry per sub-key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    /// Engine tag.
    pub source: String,
    /// Shape tag.
    pub sig_type: String,
    /// Encoded sub-signatures, in sub-key order.
    pub signatures: Vec<Vec<u8>>,
}

impl Signature {
    /// `source/sig_type` label used in errors and logs.
    pub fn scheme_label(&self) -> String {
        format!("{}/{}", self.source, self.sig_type)
    }
}
