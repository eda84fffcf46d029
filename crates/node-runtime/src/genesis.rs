//! # Genesis
//!
//! Root pair for a node started with `[genesis] create = true`. Configured
//! seeds reproduce the same pair on every node; without seeds a fresh pair
//! is generated and its seeds are logged once so other deployments can reuse
//! them.

use crate::config::GenesisConfig;
use lg_01_universe::{generate_root_pair, RootIdentity, UniverseError};
use shared_crypto::SchemeRegistry;
use thiserror::Error;
use tracing::info;

/// Genesis creation errors.
#[derive(Debug, Error)]
pub enum GenesisError {
    /// Seed list must name exactly two roots.
    #[error("Expected seeds for 2 roots, got {0}")]
    RootCount(usize),

    /// Seed is not 32 bytes of hex.
    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    /// Key derivation or root construction failed.
    #[error("Genesis failed: {0}")]
    Universe(#[from] UniverseError),
}

/// Build the configured root pair.
pub fn build_root_pair(
    config: &GenesisConfig,
    registry: &SchemeRegistry,
) -> Result<(RootIdentity, RootIdentity), GenesisError> {
    let [first_name, second_name] = &config.names;

    if config.seeds.is_empty() {
        let (a, b) = generate_root_pair(
            registry,
            &config.source,
            &config.sig_type,
            config.key_count,
            (first_name.as_str(), second_name.as_str()),
        )?;
        info!(
            "[runtime] Generated genesis seeds: {} = {:?}, {} = {:?}",
            first_name,
            encode_seeds(&a.seeds),
            second_name,
            encode_seeds(&b.seeds)
        );
        return Ok((a, b));
    }

    let [first_seeds, second_seeds] = config.seeds.as_slice() else {
        return Err(GenesisError::RootCount(config.seeds.len()));
    };
    Ok((
        root_from_seeds(config, registry, first_seeds, first_name)?,
        root_from_seeds(config, registry, second_seeds, second_name)?,
    ))
}

fn root_from_seeds(
    config: &GenesisConfig,
    registry: &SchemeRegistry,
    seeds: &[String],
    name: &str,
) -> Result<RootIdentity, GenesisError> {
    let seeds = seeds
        .iter()
        .map(|seed| decode_seed(seed))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RootIdentity::from_seeds(
        registry,
        &config.source,
        &config.sig_type,
        seeds,
        name,
        "",
    )?)
}

fn decode_seed(text: &str) -> Result<[u8; 32], GenesisError> {
    let bytes = hex::decode(text.trim()).map_err(|e| GenesisError::InvalidSeed(e.to_string()))?;
    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| GenesisError::InvalidSeed(format!("{} bytes, need 32", bytes.len())))
}

fn encode_seeds(seeds: &[[u8; 32]]) -> Vec<String> {
    seeds.iter().map(hex::encode).collect()
}
