//! # TCP Transport
//!
//! Outbound connections through [`TcpDialer`]; inbound connections through
//! [`serve_tcp`], which hands every accepted socket to the node's receive
//! loop together with the observed remote host.

use crate::domain::SyncError;
use crate::ports::{BoxedStream, Dialer};
use crate::service::Node;
use async_trait::async_trait;
use lg_03_peer_directory::PeerDescriptor;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Plain TCP dialer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpDialer;

#[async_trait]
impl Dialer for TcpDialer {
    async fn dial(&self, peer: &PeerDescriptor) -> Result<BoxedStream, SyncError> {
        let address = peer.address();
        let stream = TcpStream::connect(&address)
            .await
            .map_err(|e| SyncError::Dial {
                peer: address.clone(),
                reason: e.to_string(),
            })?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!("[lg-04] set_nodelay on {} failed: {}", address, e);
        }
        Ok(Box::new(stream))
    }
}

/// Accept connections forever, one receive loop per connection.
pub async fn serve_tcp(node: Arc<Node>, listener: TcpListener) -> std::io::Result<()> {
    info!("[lg-04] Listening on {}", listener.local_addr()?);
    loop {
        let (stream, remote) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("[lg-04] Accept failed: {}", e);
                continue;
            }
        };
        debug!("[lg-04] Inbound connection from {}", remote);
        let node = Arc::clone(&node);
        tokio::spawn(async move {
            node.serve_connection(Box::new(stream), Some(remote.ip().to_string()))
                .await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dial_refused_is_dial_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = TcpDialer.dial(&PeerDescriptor::new("127.0.0.1", port)).await;
        assert!(matches!(result, Err(SyncError::Dial { .. })));
    }
}
