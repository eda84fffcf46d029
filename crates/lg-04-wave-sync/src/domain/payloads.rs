//! # Wave Payloads
//!
//! Entities travel inside waves as individually bincode-encoded byte strings,
//! so one undecodable item never poisons the rest of a batch.

use super::errors::SyncError;
use lg_01_universe::{Message, MessageId, User};
use lg_03_peer_directory::PeerDescriptor;
use serde::{de::DeserializeOwned, Serialize};
use shared_types::{hash_from_slice, ZERO_HASH};

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, SyncError> {
    bincode::serialize(value).map_err(|e| SyncError::Encode(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SyncError> {
    bincode::deserialize(bytes).map_err(|e| SyncError::Decode(e.to_string()))
}

/// Root pair as carried by `ROOTS`.
pub fn encode_roots(a: &User, b: &User) -> Result<[Vec<u8>; 2], SyncError> {
    Ok([encode(a)?, encode(b)?])
}

/// Inverse of [`encode_roots`].
pub fn decode_roots(users: &[Vec<u8>; 2]) -> Result<(User, User), SyncError> {
    Ok((decode(&users[0])?, decode(&users[1])?))
}

/// Messages as carried by `MESSAGES`.
pub fn encode_messages(messages: &[Message]) -> Result<Vec<Vec<u8>>, SyncError> {
    messages.iter().map(encode).collect()
}

/// One message of a `MESSAGES` payload.
pub fn decode_message(bytes: &[u8]) -> Result<Message, SyncError> {
    decode(bytes)
}

/// Descriptors as carried by `PEERS`.
pub fn encode_peers<'a, I>(peers: I) -> Result<Vec<Vec<u8>>, SyncError>
where
    I: IntoIterator<Item = &'a PeerDescriptor>,
{
    peers
        .into_iter()
        .map(|peer| peer.to_bytes().map_err(SyncError::from))
        .collect()
}

/// Argument of `QUESTION(MESSAGES)`: empty means start-of-history.
pub fn encode_cursor(last_known: Option<&MessageId>) -> Vec<Vec<u8>> {
    vec![last_known.map(|id| id.to_vec()).unwrap_or_default()]
}

/// Inverse of [`encode_cursor`]. Missing, empty and all-zero arguments mean start-of-history.
pub fn decode_cursor(args: &[Vec<u8>]) -> Result<Option<MessageId>, SyncError> {
    let Some(first) = args.first() else {
        return Ok(None);
    };
    if first.is_empty() {
        return Ok(None);
    }
    let id = hash_from_slice(first).map_err(|e| SyncError::Decode(e.to_string()))?;
    Ok((id != ZERO_HASH).then_some(id))
}
