//! # Node
//!
//! Binds the ledger, the peer directory and the outbound links together.
//! The receive loop lives in `handler`, the periodic duties in `sync`.

use super::link::PeerLink;
use crate::config::SyncConfig;
use crate::domain::{decode_message, encode_messages, NodeState, SyncError};
use crate::ports::{BoxedStream, Dialer};
use lg_01_universe::{Admission, Ledger, Message, MessageId, UniverseError, User};
use lg_02_wave_codec::{Wave, WaveBody};
use lg_03_peer_directory::PeerDirectory;
use parking_lot::RwLock;
use shared_types::short_hex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of admitting one batch of serialized messages.
#[derive(Clone, Debug, Default)]
pub struct IngestReport {
    /// Newly admitted, in batch order.
    pub admitted: Vec<Message>,
    /// Already present.
    pub duplicates: usize,
    /// Rejected because a referenced message is missing.
    pub gaps: usize,
    /// Rejected for any other reason, including undecodable bytes.
    pub rejected: usize,
    /// Id of the last decodable message in the batch.
    pub last_id: Option<MessageId>,
}

/// Backfill progress against one peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeerCursor {
    /// Resume after this id; `None` is start-of-history.
    pub last: Option<MessageId>,
    /// Whether the peer's history has been walked from its start.
    pub swept: bool,
}

impl PeerCursor {
    /// First contact: resume from the local last message. Starting from
    /// nothing is already a full sweep.
    pub fn first_contact(local_last: Option<MessageId>) -> Self {
        Self {
            last: local_last,
            swept: local_last.is_none(),
        }
    }

    /// Start-of-history, marked as swept.
    pub fn rewound() -> Self {
        Self {
            last: None,
            swept: true,
        }
    }
}

/// A ledger node speaking the wave protocol.
pub struct Node {
    pub(super) config: SyncConfig,
    pub(super) ledger: Arc<Ledger>,
    pub(super) directory: Arc<PeerDirectory>,
    pub(super) dialer: Arc<dyn Dialer>,
    state: RwLock<NodeState>,
    links: RwLock<HashMap<String, Arc<PeerLink>>>,
    cursors: RwLock<HashMap<String, PeerCursor>>,
}

impl Node {
    /// Create a node. A ledger restored with roots starts in `RootsSynced`.
    pub fn new(
        config: SyncConfig,
        ledger: Arc<Ledger>,
        directory: Arc<PeerDirectory>,
        dialer: Arc<dyn Dialer>,
    ) -> Self {
        let state = if ledger.is_initialized() {
            NodeState::RootsSynced
        } else {
            NodeState::Bootstrapping
        };
        Self {
            config,
            ledger,
            directory,
            dialer,
            state: RwLock::new(state),
            links: RwLock::new(HashMap::new()),
            cursors: RwLock::new(HashMap::new()),
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Shared ledger.
    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// Known peers.
    pub fn directory(&self) -> &Arc<PeerDirectory> {
        &self.directory
    }

    /// Current synchronization phase.
    pub fn state(&self) -> NodeState {
        *self.state.read()
    }

    pub(super) fn advance(&self, transition: fn(NodeState) -> NodeState) -> NodeState {
        let mut state = self.state.write();
        let next = transition(*state);
        if next != *state {
            info!("[lg-04] State {} -> {}", *state, next);
            *state = next;
        }
        next
    }

    /// Install the genesis pair, locally created or received in `ROOTS`.
    /// Returns `false` when the same pair was already installed.
    pub fn install_roots(&self, a: User, b: User) -> Result<bool, SyncError> {
        let installed = self.ledger.install_roots(a, b)?;
        self.advance(NodeState::on_roots_installed);
        Ok(installed)
    }

    /// Admit a locally authored message and push it to every linked peer.
    pub async fn publish(&self, message: Message) -> Result<Admission, SyncError> {
        let admission = self.ledger.add_message(message.clone())?;
        let reached = self.broadcast(&[message]).await;
        debug!(
            "[lg-04] Published {} to {} peer(s)",
            short_hex(&admission.message_id),
            reached
        );
        Ok(admission)
    }

    /// Push messages to every linked peer. Returns how many links took the write.
    pub async fn broadcast(&self, messages: &[Message]) -> usize {
        if messages.is_empty() {
            return 0;
        }
        let wave = match encode_messages(messages) {
            Ok(messages) => Wave::new(WaveBody::Messages { messages }),
            Err(e) => {
                warn!("[lg-04] Cannot encode broadcast: {}", e);
                return 0;
            }
        };

        let mut reached = 0;
        for link in self.links() {
            match link.send(&wave).await {
                Ok(()) => reached += 1,
                Err(e) => {
                    warn!("[lg-04] Broadcast to {} failed: {}", link.address(), e);
                    if e.breaks_link() {
                        self.drop_link(link.address());
                    }
                }
            }
        }
        reached
    }

    /// Decode and admit a batch, one message at a time.
    pub fn ingest(&self, batch: Vec<Vec<u8>>, origin: &str) -> IngestReport {
        let mut report = IngestReport::default();
        for bytes in batch {
            let message = match decode_message(&bytes) {
                Ok(message) => message,
                Err(e) => {
                    warn!("[lg-04] Undecodable message from {}: {}", origin, e);
                    report.rejected += 1;
                    continue;
                }
            };
            report.last_id = Some(message.id);

            match self.ledger.add_message(message.clone()) {
                Ok(_) => report.admitted.push(message),
                Err(e) if e.is_duplicate() => report.duplicates += 1,
                Err(UniverseError::UnknownReference(missing)) => {
                    debug!(
                        "[lg-04] Message {} from {} references unknown {}",
                        short_hex(&message.id),
                        origin,
                        short_hex(&missing)
                    );
                    report.gaps += 1;
                }
                Err(e) => {
                    warn!(
                        "[lg-04] Rejected message {} from {}: {}",
                        short_hex(&message.id),
                        origin,
                        e
                    );
                    report.rejected += 1;
                }
            }
        }
        report
    }

    /// Snapshot of the current links.
    pub fn links(&self) -> Vec<Arc<PeerLink>> {
        self.links.read().values().cloned().collect()
    }

    /// Addresses with an open link.
    pub fn linked_peers(&self) -> Vec<String> {
        let mut peers: Vec<String> = self.links.read().keys().cloned().collect();
        peers.sort();
        peers
    }

    pub(super) fn has_link(&self, address: &str) -> bool {
        self.links.read().contains_key(address)
    }

    pub(super) fn attach_link(&self, address: String, stream: BoxedStream) {
        let link = Arc::new(PeerLink::new(address.clone(), stream));
        self.links.write().insert(address.clone(), link);
        self.set_connected(&address, true);
    }

    pub(super) fn drop_link(&self, address: &str) {
        if self.links.write().remove(address).is_some() {
            debug!("[lg-04] Dropped link to {}", address);
        }
        self.set_connected(address, false);
    }

    pub(super) fn set_connected(&self, address: &str, connected: bool) {
        let result = if connected {
            self.directory.mark_connected(address)
        } else {
            self.directory.mark_disconnected(address)
        };
        if let Err(e) = result {
            debug!("[lg-04] Cannot update {}: {}", address, e);
        }
    }

    /// Where backfill from `address` resumes.
    pub fn cursor_for(&self, address: &str) -> Option<MessageId> {
        self.peer_cursor(address).last
    }

    pub(super) fn peer_cursor(&self, address: &str) -> PeerCursor {
        self.cursors
            .read()
            .get(address)
            .copied()
            .unwrap_or_else(|| PeerCursor::first_contact(self.ledger.last_message_id()))
    }

    pub(super) fn set_cursor(&self, address: &str, cursor: PeerCursor) {
        self.cursors.write().insert(address.to_string(), cursor);
    }
}
