//! # Peer Directory Service
//!
//! Known peers keyed by `host:port`. Adds are idempotent: an existing entry
//! is never overwritten. The table is capped at `max_peers`; once full, new
//! addresses are dropped and existing entries are kept.

use crate::config::DirectoryConfig;
use crate::domain::{DirectoryError, PeerDescriptor, PeerEntry};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

/// The node's view of the network.
pub struct PeerDirectory {
    local: PeerDescriptor,
    config: DirectoryConfig,
    peers: RwLock<HashMap<String, PeerEntry>>,
}

impl PeerDirectory {
    /// Empty directory for a node advertising `local`, default limits.
    pub fn new(local: PeerDescriptor) -> Self {
        Self::with_config(local, DirectoryConfig::default())
    }

    /// Empty directory with explicit limits.
    pub fn with_config(local: PeerDescriptor, config: DirectoryConfig) -> Self {
        Self {
            local,
            config,
            peers: RwLock::new(HashMap::new()),
        }
    }

    /// Active limits.
    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Descriptor this node advertises in gossip.
    pub fn local_descriptor(&self) -> &PeerDescriptor {
        &self.local
    }

    /// Register a peer (not connected yet).
    pub fn add_peer(&self, peer: PeerDescriptor) -> Result<(), DirectoryError> {
        let address = peer.address();
        if address == self.local.address() {
            return Err(DirectoryError::SelfConnection);
        }

        let mut peers = self.peers.write();
        if peers.contains_key(&address) {
            return Err(DirectoryError::PeerAlreadyExists(address));
        }
        if peers.len() >= self.config.max_peers {
            return Err(DirectoryError::DirectoryFull {
                address,
                capacity: self.config.max_peers,
            });
        }
        debug!("[lg-03] Added peer {}", address);
        peers.insert(address, PeerEntry::new(peer));
        Ok(())
    }

    /// Add every descriptor, ignoring known and self entries. Returns how many were new.
    pub fn merge<I>(&self, descriptors: I) -> usize
    where
        I: IntoIterator<Item = PeerDescriptor>,
    {
        descriptors
            .into_iter()
            .filter(|peer| match self.add_peer(peer.clone()) {
                Ok(()) => true,
                Err(e) if e.is_benign() => false,
                Err(e) => {
                    debug!("[lg-03] Skipping peer {}: {}", peer, e);
                    false
                }
            })
            .count()
    }

    /// Forget a peer.
    pub fn remove_peer(&self, address: &str) -> Result<PeerEntry, DirectoryError> {
        self.peers
            .write()
            .remove(address)
            .ok_or_else(|| DirectoryError::PeerNotFound(address.to_string()))
    }

    /// Whether `address` is known.
    pub fn contains(&self, address: &str) -> bool {
        self.peers.read().contains_key(address)
    }

    /// Record a successful exchange.
    pub fn mark_connected(&self, address: &str) -> Result<(), DirectoryError> {
        let mut peers = self.peers.write();
        let entry = peers
            .get_mut(address)
            .ok_or_else(|| DirectoryError::PeerNotFound(address.to_string()))?;
        entry.connected = true;
        entry.last_seen = Some(Instant::now());
        entry.failures = 0;
        Ok(())
    }

    /// Record a lost connection or failed exchange. The entry stays for retry.
    pub fn mark_disconnected(&self, address: &str) -> Result<(), DirectoryError> {
        let mut peers = self.peers.write();
        let entry = peers
            .get_mut(address)
            .ok_or_else(|| DirectoryError::PeerNotFound(address.to_string()))?;
        entry.connected = false;
        entry.failures = entry.failures.saturating_add(1);
        Ok(())
    }

    /// Whether `address` currently has a live connection.
    pub fn is_connected(&self, address: &str) -> bool {
        self.peers
            .read()
            .get(address)
            .is_some_and(|entry| entry.connected)
    }

    /// Every known descriptor, sorted by address.
    pub fn peers(&self) -> Vec<PeerDescriptor> {
        self.select(|_| true)
    }

    /// Descriptors with a live connection.
    pub fn connected_peers(&self) -> Vec<PeerDescriptor> {
        self.select(|entry| entry.connected)
    }

    /// Descriptors without a live connection.
    pub fn disconnected_peers(&self) -> Vec<PeerDescriptor> {
        self.select(|entry| !entry.connected)
    }

    /// Copy of one entry.
    pub fn entry(&self, address: &str) -> Option<PeerEntry> {
        self.peers.read().get(address).cloned()
    }

    /// Number of known peers.
    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    /// Whether no peers are known.
    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }

    fn select(&self, keep: impl Fn(&PeerEntry) -> bool) -> Vec<PeerDescriptor> {
        let mut selected: Vec<_> = self
            .peers
            .read()
            .values()
            .filter(|entry| keep(*entry))
            .map(|entry| entry.descriptor.clone())
            .collect();
        selected.sort_by_key(PeerDescriptor::address);
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> PeerDirectory {
        PeerDirectory::new(PeerDescriptor::new("127.0.0.1", 7000))
    }

    #[test]
    fn test_add_is_not_overwrite() {
        let dir = directory();
        let peer = PeerDescriptor::new("10.0.0.2", 7000);
        dir.add_peer(peer.clone()).unwrap();
        dir.mark_connected(&peer.address()).unwrap();

        assert_eq!(
            dir.add_peer(peer.clone()),
            Err(DirectoryError::PeerAlreadyExists("10.0.0.2:7000".into()))
        );
        assert!(dir.is_connected(&peer.address()));
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn test_self_rejected() {
        let dir = directory();
        assert_eq!(
            dir.add_peer(PeerDescriptor::new("127.0.0.1", 7000)),
            Err(DirectoryError::SelfConnection)
        );
        assert!(dir.is_empty());
    }

    #[test]
    fn test_merge_counts_new_only() {
        let dir = directory();
        dir.add_peer(PeerDescriptor::new("a", 1)).unwrap();
        let added = dir.merge(vec![
            PeerDescriptor::new("a", 1),
            PeerDescriptor::new("b", 2),
            PeerDescriptor::new("127.0.0.1", 7000),
            PeerDescriptor::new("c", 3),
        ]);
        assert_eq!(added, 2);
        assert_eq!(dir.peers().len(), 3);
    }

    #[test]
    fn test_gossip_flood_is_capped() {
        let dir = PeerDirectory::with_config(
            PeerDescriptor::new("127.0.0.1", 7000),
            DirectoryConfig { max_peers: 3 },
        );
        dir.add_peer(PeerDescriptor::new("first", 1)).unwrap();
        let flood: Vec<_> = (0..50).map(|i| PeerDescriptor::new(format!("h{i}"), 9)).collect();

        assert_eq!(dir.merge(flood), 2);
        assert_eq!(dir.len(), 3);
        assert!(dir.contains("first:1"));
        assert!(matches!(
            dir.add_peer(PeerDescriptor::new("late", 1)),
            Err(DirectoryError::DirectoryFull { capacity: 3, .. })
        ));
        // A known peer still reports as a duplicate, not as overflow.
        assert!(matches!(
            dir.add_peer(PeerDescriptor::new("first", 1)),
            Err(DirectoryError::PeerAlreadyExists(_))
        ));

        dir.remove_peer("h0:9").unwrap();
        dir.add_peer(PeerDescriptor::new("late", 1)).unwrap();
    }

    #[test]
    fn test_disconnect_keeps_entry() {
        let dir = directory();
        let peer = PeerDescriptor::new("b", 2);
        dir.add_peer(peer.clone()).unwrap();
        dir.mark_connected("b:2").unwrap();
        dir.mark_disconnected("b:2").unwrap();

        assert!(dir.contains("b:2"));
        assert_eq!(dir.connected_peers(), vec![]);
        assert_eq!(dir.disconnected_peers(), vec![peer]);
        assert_eq!(dir.entry("b:2").unwrap().failures, 1);
    }

    #[test]
    fn test_unknown_peer_operations() {
        let dir = directory();
        assert!(matches!(dir.mark_connected("x:1"), Err(DirectoryError::PeerNotFound(_))));
        assert!(matches!(dir.remove_peer("x:1"), Err(DirectoryError::PeerNotFound(_))));
    }

    #[test]
    fn test_peers_sorted() {
        let dir = directory();
        dir.merge(vec![PeerDescriptor::new("c", 3), PeerDescriptor::new("a", 1)]);
        let addresses: Vec<_> = dir.peers().iter().map(PeerDescriptor::address).collect();
        assert_eq!(addresses, vec!["a:1", "c:3"]);
    }
}
