//! # Core Identifiers
//!
//! The fixed-width content identifier shared by users, messages and waves.

use rand::RngCore;

use crate::errors::HashParseError;

/// Length of a [`Hash`] in bytes.
pub const HASH_LENGTH: usize = 32;

/// A 32-byte content identifier (SHA-256 output).
pub type Hash = [u8; HASH_LENGTH];

/// The all-zero hash. Used on the wire to mean "no message yet".
pub const ZERO_HASH: Hash = [0u8; HASH_LENGTH];

/// Render a hash as lowercase hex.
pub fn hash_to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

/// First four bytes of a hash as hex, for log lines.
pub fn short_hex(hash: &Hash) -> String {
    hex::encode(&hash[..4])
}

/// Parse a 64-character hex string into a hash.
pub fn hash_from_hex(s: &str) -> Result<Hash, HashParseError> {
    let bytes = hex::decode(s).map_err(|e| HashParseError::InvalidHex(e.to_string()))?;
    hash_from_slice(&bytes)
}

/// Copy an exact 32-byte slice into a hash.
pub fn hash_from_slice(bytes: &[u8]) -> Result<Hash, HashParseError> {
    if bytes.len() != HASH_LENGTH {
        return Err(HashParseError::InvalidLength {
            expected: HASH_LENGTH,
            actual: bytes.len(),
        });
    }
    let mut hash = ZERO_HASH;
    hash.copy_from_slice(bytes);
    Ok(hash)
}

/// Generate a random hash for protocol correlation (wave ids).
///
/// Entity ids are content-derived and must never come from here.
pub fn random_hash() -> Hash {
    let mut hash = ZERO_HASH;
    rand::thread_rng().fill_bytes(&mut hash);
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let hash = [0xABu8; 32];
        let parsed = hash_from_hex(&hash_to_hex(&hash)).unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn test_short_hex() {
        assert_eq!(short_hex(&[0x01u8; 32]), "01010101");
    }

    #[test]
    fn test_wrong_length_rejected() {
        let err = hash_from_slice(&[1u8; 31]).unwrap_err();
        assert_eq!(
            err,
            HashParseError::InvalidLength {
                expected: 32,
                actual: 31
            }
        );
    }

    #[test]
    fn test_invalid_hex_rejected() {
        assert!(matches!(
            hash_from_hex("zz"),
            Err(HashParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_random_hashes_differ() {
        assert_ne!(random_hash(), random_hash());
    }
}
