//! Peer descriptors and directory entries.

use super::errors::DirectoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Instant;

/// Gossipable network address of a node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerDescriptor {
    /// Host name or IP literal.
    pub host: String,
    /// Listening port.
    pub port: u16,
}

impl PeerDescriptor {
    /// Create a descriptor.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Descriptor for a socket address.
    pub fn from_socket_addr(addr: SocketAddr) -> Self {
        Self::new(addr.ip().to_string(), addr.port())
    }

    /// Directory key and dial target (`host:port`, IPv6 bracketed).
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Wire bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DirectoryError> {
        bincode::serialize(self).map_err(|e| DirectoryError::InvalidDescriptor(e.to_string()))
    }

    /// Parse wire bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DirectoryError> {
        let descriptor: Self = bincode::deserialize(bytes)
            .map_err(|e| DirectoryError::InvalidDescriptor(e.to_string()))?;
        if descriptor.host.is_empty() || descriptor.port == 0 {
            return Err(DirectoryError::InvalidDescriptor(descriptor.address()));
        }
        Ok(descriptor)
    }
}

impl fmt::Display for PeerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())
    }
}

impl FromStr for PeerDescriptor {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DirectoryError::InvalidDescriptor(s.to_string());
        let (host, port) = s.trim().rsplit_once(':').ok_or_else(invalid)?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        let port: u16 = port.parse().map_err(|_| invalid())?;
        if host.is_empty() || port == 0 {
            return Err(invalid());
        }
        Ok(Self::new(host, port))
    }
}

/// Directory record for one peer.
#[derive(Clone, Debug)]
pub struct PeerEntry {
    /// Gossiped descriptor.
    pub descriptor: PeerDescriptor,
    /// Whether a live connection exists.
    pub connected: bool,
    /// Last successful exchange.
    pub last_seen: Option<Instant>,
    /// Consecutive failed exchanges.
    pub failures: u32,
}

impl PeerEntry {
    /// Fresh, not yet connected entry.
    pub fn new(descriptor: PeerDescriptor) -> Self {
        Self {
            descriptor,
            connected: false,
            last_seen: None,
            failures: 0,
        }
    }
}
