//! # Wave Commands
//!
//! Closed set of wire tags. Anything else is rejected at decode time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire command tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum Command {
    /// Keepalive request.
    Ping = 1,
    /// Keepalive answer.
    Pong = 2,
    /// Request carrying a sub-command and opaque arguments.
    Question = 3,
    /// The two root users.
    Roots = 4,
    /// Serialized peer descriptors.
    Peers = 5,
    /// Serialized messages.
    Messages = 6,
    /// Failure report correlated by wave id.
    Err = 7,
}

impl Command {
    /// Every command, in tag order.
    pub const ALL: [Command; 7] = [
        Self::Ping,
        Self::Pong,
        Self::Question,
        Self::Roots,
        Self::Peers,
        Self::Messages,
        Self::Err,
    ];

    /// Wire tag.
    pub fn tag(self) -> u16 {
        self as u16
    }

    /// Parse a wire tag.
    pub fn from_tag(tag: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.tag() == tag)
    }

    /// Whether this command may appear as a `QUESTION` sub-command.
    pub fn is_question_topic(self) -> bool {
        matches!(self, Self::Roots | Self::Peers | Self::Messages)
    }

    /// Upper-case wire name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Ping => "PING",
            Self::Pong => "PONG",
            Self::Question => "QUESTION",
            Self::Roots => "ROOTS",
            Self::Peers => "PEERS",
            Self::Messages => "MESSAGES",
            Self::Err => "ERR",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
