//! Domain layer for the synchronization engine.

pub mod errors;
pub mod payloads;
pub mod state;

pub use errors::SyncError;
pub use payloads::{
    decode_cursor, decode_message, decode_roots, encode_cursor, encode_messages, encode_peers,
    encode_roots,
};
pub use state::NodeState;
