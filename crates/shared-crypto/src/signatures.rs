//! # Ed25519 Engine
//!
//! Twisted Edwards curve signatures with deterministic nonces.
//!
//! - Secret sub-key: 32-byte seed
//! - Public sub-key: 32 bytes
//! - Sub-signature: 64 bytes

use crate::registry::SignatureEngine;
use crate::CryptoError;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use zeroize::Zeroizing;

/// Engine tag.
pub const ED25519_SOURCE: &str = "ed25519";

/// Ed25519 signing engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519Engine;

impl Ed25519Engine {
    fn signing_key(secret: &[u8]) -> Result<SigningKey, CryptoError> {
        let seed: Zeroizing<[u8; 32]> = Zeroizing::new(secret.try_into().map_err(|_| {
            CryptoError::KeyMismatch(format!(
                "ed25519 secret must be 32 bytes, got {}",
                secret.len()
            ))
        })?);
        Ok(SigningKey::from_bytes(&seed))
    }
}

impl SignatureEngine for Ed25519Engine {
    fn source(&self) -> &'static str {
        ED25519_SOURCE
    }

    fn generate_secret(&self) -> Vec<u8> {
        SigningKey::generate(&mut rand::thread_rng())
            .to_bytes()
            .to_vec()
    }

    fn secret_from_seed(&self, seed: &[u8; 32]) -> Result<Vec<u8>, CryptoError> {
        Ok(seed.to_vec())
    }

    fn public_from_secret(&self, secret: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let signing_key = Self::signing_key(secret)?;
        Ok(signing_key.verifying_key().to_bytes().to_vec())
    }

    fn sign(&self, payload: &[u8], secret: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let signing_key = Self::signing_key(secret)?;
        Ok(signing_key.sign(payload).to_bytes().to_vec())
    }

    fn verify(&self, payload: &[u8], public: &[u8], signature: &[u8]) -> Result<bool, CryptoError> {
        let public: [u8; 32] = public.try_into().map_err(|_| {
            CryptoError::Malformed(format!(
                "ed25519 public key must be 32 bytes, got {}",
                public.len()
            ))
        })?;
        let verifying_key = VerifyingKey::from_bytes(&public)
            .map_err(|_| CryptoError::Malformed("ed25519 public key is not a curve point".into()))?;
        let sig = ed25519_dalek::Signature::from_slice(signature).map_err(|_| {
            CryptoError::Malformed(format!(
                "ed25519 signature must be 64 bytes, got {}",
                signature.len()
            ))
        })?;

        Ok(verifying_key.verify(payload, &sig).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify() {
        let engine = Ed25519Engine;
        let secret = engine.generate_secret();
        let public = engine.public_from_secret(&secret).unwrap();

        let signature = engine.sign(b"Hello, Ed25519!", &secret).unwrap();
        assert_eq!(signature.len(), 64);
        assert!(engine.verify(b"Hello, Ed25519!", &public, &signature).unwrap());
    }

    #[test]
    fn test_wrong_message_fails() {
        let engine = Ed25519Engine;
        let secret = engine.generate_secret();
        let public = engine.public_from_secret(&secret).unwrap();

        let signature = engine.sign(b"message1", &secret).unwrap();
        assert!(!engine.verify(b"message2", &public, &signature).unwrap());
    }

    #[test]
    fn test_deterministic_signatures() {
        let engine = Ed25519Engine;
        let secret = engine.secret_from_seed(&[0xAB; 32]).unwrap();

        let sig1 = engine.sign(b"deterministic test", &secret).unwrap();
        let sig2 = engine.sign(b"deterministic test", &secret).unwrap();
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn test_truncated_signature_is_malformed() {
        let engine = Ed25519Engine;
        let secret = engine.generate_secret();
        let public = engine.public_from_secret(&secret).unwrap();

        let result = engine.verify(b"x", &public, &[0u8; 10]);
        assert!(matches!(result, Err(CryptoError::Malformed(_))));
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = Ed25519Engine.sign(b"x", &[1u8; 16]);
        assert!(matches!(result, Err(CryptoError::KeyMismatch(_))));
    }
}
