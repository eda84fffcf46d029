//! # secp256k1 Engine
//!
//! ECDSA over secp256k1 with RFC 6979 deterministic nonces and low-S
//! normalization.
//!
//! - Secret sub-key: 32-byte scalar
//! - Public sub-key: 33-byte SEC1 compressed point
//! - Sub-signature: 64 bytes (r||s)

use crate::registry::SignatureEngine;
use crate::CryptoError;
use k256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};

/// Engine tag.
pub const SECP256K1_SOURCE: &str = "secp256k1";

/// secp256k1 ECDSA signing engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct Secp256k1Engine;

impl Secp256k1Engine {
    fn signing_key(secret: &[u8]) -> Result<SigningKey, CryptoError> {
        SigningKey::from_slice(secret)
            .map_err(|_| CryptoError::KeyMismatch("invalid secp256k1 secret scalar".into()))
    }
}

impl SignatureEngine for Secp256k1Engine {
    fn source(&self) -> &'static str {
        SECP256K1_SOURCE
    }

    fn generate_secret(&self) -> Vec<u8> {
        SigningKey::random(&mut rand::thread_rng())
            .to_bytes()
            .to_vec()
    }

    fn secret_from_seed(&self, seed: &[u8; 32]) -> Result<Vec<u8>, CryptoError> {
        // Zero and out-of-range scalars are rejected here.
        Ok(Self::signing_key(seed)?.to_bytes().to_vec())
    }

    fn public_from_secret(&self, secret: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let signing_key = Self::signing_key(secret)?;
        Ok(signing_key.verifying_key().to_sec1_bytes().to_vec())
    }

    fn sign(&self, payload: &[u8], secret: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let signing_key = Self::signing_key(secret)?;
        let sig: Signature = signing_key.sign(payload);
        Ok(sig.to_bytes().to_vec())
    }

    fn verify(&self, payload: &[u8], public: &[u8], signature: &[u8]) -> Result<bool, CryptoError> {
        let verifying_key = VerifyingKey::from_sec1_bytes(public)
            .map_err(|_| CryptoError::Malformed("invalid secp256k1 public key".into()))?;
        let sig = Signature::from_slice(signature)
            .map_err(|_| CryptoError::Malformed("invalid secp256k1 signature encoding".into()))?;

        Ok(verifying_key.verify(payload, &sig).is_ok())
    }
}
