//! # Shared Crypto - Identity Capability
//!
//! Opaque signer/verifier keyed by a declared scheme identifier.
//!
//! ## Components
//!
//! | Module | Contents |
//! |--------|----------|
//! | `keys` | Tagged [`PublicKey`], [`PrivateKey`], [`Signature`] envelopes |
//! | `registry` | [`SchemeRegistry`] lookup table and the [`SignatureEngine`] trait |
//! | `signatures` | Ed25519 engine (`source = "ed25519"`) |
//! | `ecdsa` | secp256k1 ECDSA engine (`source = "secp256k1"`) |
//! | `hashing` | SHA-256 helpers used for content addressing |
//!
//! ## Dispatch
//!
//! Every key and signature carries a `source` tag (which engine) and a
//! `sig_type` tag (`single-key` or `multi-key`). Verification dispatches on
//! those tags only. Unknown tags fail closed with
//! [`CryptoError::SchemeUnsupported`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;
pub mod keys;
pub mod registry;
pub mod signatures;

// Re-exports
pub use ecdsa::{Secp256k1Engine, SECP256K1_SOURCE};
pub use errors::CryptoError;
pub use hashing::{sha256, sha256_many};
pub use keys::{PrivateKey, PublicKey, Signature, MULTI_KEY, SINGLE_KEY};
pub use registry::{SchemeRegistry, SignatureEngine};
pub use signatures::{Ed25519Engine, ED25519_SOURCE};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
