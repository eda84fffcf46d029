//! # Peer Links
//!
//! One outbound connection per peer. A link carries one exchange at a time:
//! the question is written, then frames are read until one carries the same
//! `wave_id`. Uncorrelated frames (late replies, `ERR`s for pushed batches)
//! are skipped.

use crate::domain::SyncError;
use crate::ports::BoxedStream;
use lg_02_wave_codec::{read_wave, write_wave, Wave};
use shared_types::short_hex;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Outbound connection to one peer.
pub struct PeerLink {
    address: String,
    stream: Mutex<BoxedStream>,
}

impl PeerLink {
    /// Wrap an established stream.
    pub fn new(address: impl Into<String>, stream: BoxedStream) -> Self {
        Self {
            address: address.into(),
            stream: Mutex::new(stream),
        }
    }

    /// Peer address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Write a wave without waiting for an answer.
    pub async fn send(&self, wave: &Wave) -> Result<(), SyncError> {
        let mut stream = self.stream.lock().await;
        write_wave(&mut *stream, wave).await?;
        Ok(())
    }

    /// Write `wave` and wait up to `deadline` for the wave answering it.
    ///
    /// A timeout may leave a partially read frame behind, so callers drop
    /// the link on [`SyncError::breaks_link`].
    pub async fn exchange(&self, wave: &Wave, deadline: Duration) -> Result<Wave, SyncError> {
        let mut stream = self.stream.lock().await;
        write_wave(&mut *stream, wave).await?;

        let wait = async {
            loop {
                match read_wave(&mut *stream).await {
                    Ok(reply) if reply.wave_id == wave.wave_id => return Ok(reply),
                    Ok(other) => debug!(
                        "[lg-04] Skipping uncorrelated {} {} from {}",
                        other.command(),
                        short_hex(&other.wave_id),
                        self.address
                    ),
                    Err(e) if e.is_fatal() || e.wave_id() == Some(wave.wave_id) => {
                        return Err(SyncError::Codec(e))
                    }
                    Err(e) => warn!("[lg-04] Bad frame from {}: {}", self.address, e),
                }
            }
        };

        tokio::time::timeout(deadline, wait)
            .await
            .map_err(|_| SyncError::Timeout {
                peer: self.address.clone(),
                command: wave.command(),
            })?
    }
}
