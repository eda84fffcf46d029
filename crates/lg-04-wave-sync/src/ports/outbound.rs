//! # Outbound Ports
//!
//! The engine never opens sockets itself. It asks a [`Dialer`] for a
//! bidirectional byte stream to a peer and speaks framed waves over it.

use crate::domain::SyncError;
use async_trait::async_trait;
use lg_03_peer_directory::PeerDescriptor;
use tokio::io::{AsyncRead, AsyncWrite};

/// Any ordered, reliable byte stream.
pub trait WaveStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> WaveStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// Owned stream handed between the dialer, the links and the receive loop.
pub type BoxedStream = Box<dyn WaveStream>;

/// Opens connections to peers.
#[async_trait]
pub trait Dialer: Send + Sync {
    /// Connect to `peer`.
    async fn dial(&self, peer: &PeerDescriptor) -> Result<BoxedStream, SyncError>;
}
