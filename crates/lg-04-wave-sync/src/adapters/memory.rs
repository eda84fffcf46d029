//! # In-Memory Transport
//!
//! Nodes register on a shared [`MemoryNetwork`]; dialing a registered
//! address creates a `tokio::io::duplex` pipe and starts the target's
//! receive loop on the far end. Used by tests and local simulations.

use crate::domain::SyncError;
use crate::ports::{BoxedStream, Dialer};
use crate::service::Node;
use async_trait::async_trait;
use lg_03_peer_directory::PeerDescriptor;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

const PIPE_CAPACITY: usize = 1 << 20;

/// Address book of in-process nodes.
#[derive(Default)]
pub struct MemoryNetwork {
    nodes: RwLock<HashMap<String, Weak<Node>>>,
}

impl MemoryNetwork {
    /// Create an empty network.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make `node` reachable at its local descriptor's address.
    pub fn register(&self, node: &Arc<Node>) {
        let address = node.directory().local_descriptor().address();
        self.nodes.write().insert(address, Arc::downgrade(node));
    }

    /// Make an address unreachable.
    pub fn unregister(&self, address: &str) {
        self.nodes.write().remove(address);
    }

    /// Dialer whose connections appear to come from `local_host`.
    pub fn dialer(self: &Arc<Self>, local_host: impl Into<String>) -> MemoryDialer {
        MemoryDialer {
            network: Arc::clone(self),
            local_host: local_host.into(),
        }
    }

    fn lookup(&self, address: &str) -> Option<Arc<Node>> {
        self.nodes.read().get(address).and_then(Weak::upgrade)
    }
}

/// Dialer over a [`MemoryNetwork`].
pub struct MemoryDialer {
    network: Arc<MemoryNetwork>,
    local_host: String,
}

#[async_trait]
impl Dialer for MemoryDialer {
    async fn dial(&self, peer: &PeerDescriptor) -> Result<BoxedStream, SyncError> {
        let address = peer.address();
        let target = self.network.lookup(&address).ok_or_else(|| SyncError::Dial {
            peer: address.clone(),
            reason: "connection refused".to_string(),
        })?;

        let (near, far) = tokio::io::duplex(PIPE_CAPACITY);
        let remote_host = self.local_host.clone();
        tokio::spawn(async move {
            target.serve_connection(Box::new(far), Some(remote_host)).await;
        });
        Ok(Box::new(near))
    }
}
