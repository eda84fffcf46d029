//! # Scheme Registry
//!
//! Lookup table from `source` tag to [`SignatureEngine`]. The shape tag is
//! handled here so engines only ever see one sub-key at a time.

use crate::ecdsa::Secp256k1Engine;
use crate::keys::{PrivateKey, PublicKey, Signature, MULTI_KEY, SINGLE_KEY};
use crate::signatures::Ed25519Engine;
use crate::CryptoError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A single-key signature algorithm.
pub trait SignatureEngine: Send + Sync {
    /// Tag this engine answers to.
    fn source(&self) -> &'static str;

    /// Fresh random secret sub-key.
    fn generate_secret(&self) -> Vec<u8>;

    /// Deterministic secret sub-key from a 32-byte seed.
    fn secret_from_seed(&self, seed: &[u8; 32]) -> Result<Vec<u8>, CryptoError>;

    /// Public sub-key for a secret sub-key.
    fn public_from_secret(&self, secret: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Sign `payload` with one secret sub-key.
    fn sign(&self, payload: &[u8], secret: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// `Ok(false)` for a well-formed signature that does not verify.
    fn verify(&self, payload: &[u8], public: &[u8], signature: &[u8]) -> Result<bool, CryptoError>;
}

/// Registered signature engines, keyed by `source` tag.
#[derive(Clone)]
pub struct SchemeRegistry {
    engines: HashMap<&'static str, Arc<dyn SignatureEngine>>,
}

impl fmt::Debug for SchemeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeRegistry")
            .field("sources", &self.sources())
            .finish()
    }
}

impl Default for SchemeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl SchemeRegistry {
    /// Registry with no engines; everything fails with `SchemeUnsupported`.
    pub fn empty() -> Self {
        Self {
            engines: HashMap::new(),
        }
    }

    /// Registry with the Ed25519 and secp256k1 engines.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(Ed25519Engine));
        registry.register(Arc::new(Secp256k1Engine));
        registry
    }

    /// Add (or replace) an engine under its own tag.
    pub fn register(&mut self, engine: Arc<dyn SignatureEngine>) {
        self.engines.insert(engine.source(), engine);
    }

    /// Registered `source` tags, sorted.
    pub fn sources(&self) -> Vec<&'static str> {
        let mut sources: Vec<_> = self.engines.keys().copied().collect();
        sources.sort_unstable();
        sources
    }

    /// Whether the `(source, sig_type)` pair can be used.
    pub fn supports(&self, source: &str, sig_type: &str) -> bool {
        self.engine(source, sig_type).is_ok()
    }

    fn engine(&self, source: &str, sig_type: &str) -> Result<&dyn SignatureEngine, CryptoError> {
        let known_shape = sig_type == SINGLE_KEY || sig_type == MULTI_KEY;
        match self.engines.get(source) {
            Some(engine) if known_shape => Ok(engine.as_ref()),
            _ => Err(CryptoError::SchemeUnsupported {
                engine: source.to_string(),
                sig_type: sig_type.to_string(),
            }),
        }
    }

    /// Generate a fresh key pair with `key_count` sub-keys.
    pub fn generate(
        &self,
        source: &str,
        sig_type: &str,
        key_count: usize,
    ) -> Result<(PrivateKey, PublicKey), CryptoError> {
        let engine = self.engine(source, sig_type)?;
        check_shape(sig_type, key_count)?;

        let secrets = (0..key_count).map(|_| engine.generate_secret()).collect();
        self.assemble(engine, sig_type, secrets)
    }

    /// Deterministic key pair, one sub-key per seed.
    pub fn from_seeds(
        &self,
        source: &str,
        sig_type: &str,
        seeds: &[[u8; 32]],
    ) -> Result<(PrivateKey, PublicKey), CryptoError> {
        let engine = self.engine(source, sig_type)?;
        check_shape(sig_type, seeds.len())?;

        let secrets = seeds
            .iter()
            .map(|seed| engine.secret_from_seed(seed))
            .collect::<Result<Vec<_>, _>>()?;
        self.assemble(engine, sig_type, secrets)
    }

    fn assemble(
        &self,
        engine: &dyn SignatureEngine,
        sig_type: &str,
        secrets: Vec<Vec<u8>>,
    ) -> Result<(PrivateKey, PublicKey), CryptoError> {
        let private = PrivateKey {
            source: engine.source().to_string(),
            sig_type: sig_type.to_string(),
            keys: secrets,
        };
        let public = self.public_key(&private)?;
        Ok((private, public))
    }

    /// Derive the public key for `private`.
    pub fn public_key(&self, private: &PrivateKey) -> Result<PublicKey, CryptoError> {
        let engine = self.engine(&private.source, &private.sig_type)?;
        check_shape(&private.sig_type, private.keys.len())?;

        let keys = private
            .keys
            .iter()
            .map(|secret| engine.public_from_secret(secret))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PublicKey {
            source: private.source.clone(),
            sig_type: private.sig_type.clone(),
            keys,
        })
    }

    /// Sign `payload` with every sub-key of `private`.
    pub fn sign(&self, payload: &[u8], private: &PrivateKey) -> Result<Signature, CryptoError> {
        let engine = self.engine(&private.source, &private.sig_type)?;
        check_shape(&private.sig_type, private.keys.len())?;

        let signatures = private
            .keys
            .iter()
            .map(|secret| engine.sign(payload, secret))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Signature {
            source: private.source.clone(),
            sig_type: private.sig_type.clone(),
            signatures,
        })
    }

    /// Check `signature` over `payload` against `public`.
    ///
    /// Multi-key signatures verify only if every sub-signature verifies
    /// against the sub-key at the same position.
    pub fn verify(
        &self,
        payload: &[u8],
        signature: &Signature,
        public: &PublicKey,
    ) -> Result<bool, CryptoError> {
        if signature.source != public.source || signature.sig_type != public.sig_type {
            return Err(CryptoError::SchemeMismatch {
                signature: signature.scheme_label(),
                key: public.scheme_label(),
            });
        }

        let engine = self.engine(&public.source, &public.sig_type)?;
        check_shape(&public.sig_type, public.keys.len())?;

        if signature.signatures.len() != public.keys.len() {
            return Err(CryptoError::Malformed(format!(
                "{} sub-signatures for {} sub-keys",
                signature.signatures.len(),
                public.keys.len()
            )));
        }

        for (key, sig) in public.keys.iter().zip(&signature.signatures) {
            if !engine.verify(payload, key, sig)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn check_shape(sig_type: &str, key_count: usize) -> Result<(), CryptoError> {
    match sig_type {
        SINGLE_KEY if key_count != 1 => Err(CryptoError::KeyMismatch(format!(
            "single-key scheme needs exactly 1 sub-key, got {key_count}"
        ))),
        MULTI_KEY if key_count == 0 => Err(CryptoError::KeyMismatch(
            "multi-key scheme needs at least 1 sub-key".into(),
        )),
        _ => Ok(()),
    }
}
