//! # Waves
//!
//! Two layers: the [`Envelope`] is what travels in a frame (`wave_id`, raw
//! command tag, payload bytes); a [`Wave`] is the typed view. Splitting them
//! lets a receiver learn the `wave_id` of a wave it cannot interpret and
//! answer it with a correlated `ERR`.

use super::command::Command;
use super::errors::CodecError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use shared_types::{random_hash, Hash};

/// Raw frame contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Correlation token (random, never an entity id).
    pub wave_id: Hash,
    /// Raw command tag.
    pub command: u16,
    /// Command-specific payload.
    pub payload: Vec<u8>,
}

/// Command-specific fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WaveBody {
    /// Keepalive request.
    Ping,
    /// Keepalive answer.
    Pong,
    /// Request about `topic` (`ROOTS`, `PEERS` or `MESSAGES`).
    Question {
        /// Requested command.
        topic: Command,
        /// Opaque arguments.
        args: Vec<Vec<u8>>,
    },
    /// The two serialized root users.
    Roots {
        /// Serialized users.
        users: [Vec<u8>; 2],
    },
    /// Serialized peer descriptors.
    Peers {
        /// Serialized descriptors.
        peers: Vec<Vec<u8>>,
    },
    /// Serialized messages.
    Messages {
        /// Serialized messages.
        messages: Vec<Vec<u8>>,
    },
    /// Failure of the exchange sharing this wave's id.
    Err {
        /// Human-readable reason.
        error: String,
    },
}

impl WaveBody {
    /// Command tag of this body.
    pub fn command(&self) -> Command {
        match self {
            Self::Ping => Command::Ping,
            Self::Pong => Command::Pong,
            Self::Question { .. } => Command::Question,
            Self::Roots { .. } => Command::Roots,
            Self::Peers { .. } => Command::Peers,
            Self::Messages { .. } => Command::Messages,
            Self::Err { .. } => Command::Err,
        }
    }
}

/// Typed protocol envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wave {
    /// Correlation token.
    pub wave_id: Hash,
    /// Command-specific fields.
    pub body: WaveBody,
}

impl Wave {
    /// New wave with a fresh random id.
    pub fn new(body: WaveBody) -> Self {
        Self {
            wave_id: random_hash(),
            body,
        }
    }

    /// Answer to the wave identified by `wave_id`.
    pub fn reply(wave_id: Hash, body: WaveBody) -> Self {
        Self { wave_id, body }
    }

    /// `QUESTION(topic, args)` with a fresh id.
    pub fn question(topic: Command, args: Vec<Vec<u8>>) -> Self {
        Self::new(WaveBody::Question { topic, args })
    }

    /// `ERR` correlated with `wave_id`.
    pub fn error(wave_id: Hash, error: impl Into<String>) -> Self {
        Self::reply(
            wave_id,
            WaveBody::Err {
                error: error.into(),
            },
        )
    }

    /// Command tag of this wave.
    pub fn command(&self) -> Command {
        self.body.command()
    }

    /// Lower to an envelope.
    pub fn to_envelope(&self) -> Result<Envelope, CodecError> {
        let payload = match &self.body {
            WaveBody::Ping | WaveBody::Pong => Vec::new(),
            WaveBody::Question { topic, args } => encode(&(topic.tag(), args))?,
            WaveBody::Roots { users } => encode(users)?,
            WaveBody::Peers { peers } => encode(peers)?,
            WaveBody::Messages { messages } => encode(messages)?,
            WaveBody::Err { error } => encode(error)?,
        };

        Ok(Envelope {
            wave_id: self.wave_id,
            command: self.command().tag(),
            payload,
        })
    }

    /// Lift an envelope, rejecting unknown commands and bad payloads.
    pub fn from_envelope(envelope: Envelope) -> Result<Self, CodecError> {
        let wave_id = envelope.wave_id;
        let command = Command::from_tag(envelope.command).ok_or(CodecError::UnsupportedCommand {
            wave_id,
            tag: envelope.command,
        })?;
        let payload = envelope.payload.as_slice();

        let body = match command {
            Command::Ping => WaveBody::Ping,
            Command::Pong => WaveBody::Pong,
            Command::Question => {
                let (tag, args): (u16, Vec<Vec<u8>>) = decode(wave_id, payload)?;
                let topic = Command::from_tag(tag)
                    .filter(|c| c.is_question_topic())
                    .ok_or(CodecError::UnsupportedCommand { wave_id, tag })?;
                WaveBody::Question { topic, args }
            }
            Command::Roots => WaveBody::Roots {
                users: decode(wave_id, payload)?,
            },
            Command::Peers => WaveBody::Peers {
                peers: decode(wave_id, payload)?,
            },
            Command::Messages => WaveBody::Messages {
                messages: decode(wave_id, payload)?,
            },
            Command::Err => WaveBody::Err {
                error: decode(wave_id, payload)?,
            },
        };

        Ok(Self { wave_id, body })
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    bincode::serialize(value).map_err(|e| CodecError::Encode(e.to_string()))
}

fn decode<T: DeserializeOwned>(wave_id: Hash, payload: &[u8]) -> Result<T, CodecError> {
    bincode::deserialize(payload).map_err(|e| CodecError::Malformed {
        wave_id: Some(wave_id),
        reason: e.to_string(),
    })
}
