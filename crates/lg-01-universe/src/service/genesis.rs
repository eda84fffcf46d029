//! # Genesis
//!
//! Creation of the two root users that seed a universe.

use crate::domain::{UniverseError, User};
use shared_crypto::{PrivateKey, SchemeRegistry};

/// Fresh keys tried before giving up on finding an opposite-gender partner.
pub const MAX_ROOT_ATTEMPTS: usize = 256;

/// A root user together with its secret material.
#[derive(Clone, Debug)]
pub struct RootIdentity {
    /// The root user.
    pub user: User,
    /// Its private key.
    pub key: PrivateKey,
    /// Seeds the key was derived from, one per sub-key.
    pub seeds: Vec<[u8; 32]>,
}

impl RootIdentity {
    /// Deterministic root identity.
    pub fn from_seeds(
        registry: &SchemeRegistry,
        source: &str,
        sig_type: &str,
        seeds: Vec<[u8; 32]>,
        name: &str,
        extra: &str,
    ) -> Result<Self, UniverseError> {
        let (key, auth) = registry.from_seeds(source, sig_type, &seeds)?;
        let user = User::root(auth, name, extra)?;
        Ok(Self { user, key, seeds })
    }

    fn random(
        registry: &SchemeRegistry,
        source: &str,
        sig_type: &str,
        key_count: usize,
        name: &str,
    ) -> Result<Self, UniverseError> {
        let seeds = (0..key_count).map(|_| rand::random::<[u8; 32]>()).collect();
        Self::from_seeds(registry, source, sig_type, seeds, name, "")
    }
}

/// Generate a root pair of opposite genders, retrying the second key.
pub fn generate_root_pair(
    registry: &SchemeRegistry,
    source: &str,
    sig_type: &str,
    key_count: usize,
    names: (&str, &str),
) -> Result<(RootIdentity, RootIdentity), UniverseError> {
    let first = RootIdentity::random(registry, source, sig_type, key_count, names.0)?;
    let wanted = first.user.gender()?.opposite();

    for _ in 0..MAX_ROOT_ATTEMPTS {
        let second = RootIdentity::random(registry, source, sig_type, key_count, names.1)?;
        if second.user.gender()? == wanted {
            return Ok((first, second));
        }
    }

    Err(UniverseError::InvalidRootPair(format!(
        "no {wanted} partner after {MAX_ROOT_ATTEMPTS} attempts"
    )))
}
