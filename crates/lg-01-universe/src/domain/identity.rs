//! # Identity Derivation
//!
//! Canonical bytes, content ids and derived gender. Gender is never stored:
//! it is recomputed from the public key every time it is needed.

use super::errors::UniverseError;
use serde::{Deserialize, Serialize};
use shared_crypto::{sha256, sha256_many, PublicKey};
use shared_types::Hash;
use std::fmt;

/// Canonical (bincode) serialization of identity-relevant fields.
pub fn canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, UniverseError> {
    bincode::serialize(value).map_err(|e| UniverseError::Encoding(e.to_string()))
}

/// SHA-256 over the canonical bytes of `value`.
pub fn content_hash<T: Serialize + ?Sized>(value: &T) -> Result<Hash, UniverseError> {
    Ok(sha256(&canonical_bytes(value)?))
}

/// Derived gender of a user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Even final digest byte.
    Female,
    /// Odd final digest byte.
    Male,
}

impl Gender {
    /// The other gender.
    pub fn opposite(self) -> Self {
        match self {
            Self::Female => Self::Male,
            Self::Male => Self::Female,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Female => write!(f, "female"),
            Self::Male => write!(f, "male"),
        }
    }
}

/// Gender as a pure function of the public key bytes.
///
/// Only the concatenated sub-keys are hashed; the scheme tags do not count.
pub fn derive_gender(auth: &PublicKey) -> Result<Gender, UniverseError> {
    let parts: Vec<&[u8]> = auth.keys.iter().map(Vec::as_slice).collect();
    let digest = sha256_many(&parts);
    if digest[digest.len() - 1] & 1 == 1 {
        Ok(Gender::Male)
    } else {
        Ok(Gender::Female)
    }
}
