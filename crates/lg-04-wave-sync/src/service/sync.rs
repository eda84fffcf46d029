//! # Sync Duties
//!
//! One cycle: dial known peers, fetch roots while bootstrapping, then gossip
//! peers, ping, and backfill messages from every linked peer.

use super::link::PeerLink;
use super::node::{Node, PeerCursor};
use crate::domain::{decode_roots, encode_cursor, NodeState, SyncError};
use lg_02_wave_codec::{Command, Wave, WaveBody};
use tracing::{debug, info, warn};

/// Summary of one sync cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleReport {
    /// State after the cycle.
    pub state: NodeState,
    /// Open links after dialing.
    pub linked: usize,
    /// New peers learned through gossip.
    pub peers_learned: usize,
    /// Peers that answered `PING`.
    pub pongs: usize,
    /// Messages admitted through backfill.
    pub messages_admitted: usize,
}

impl Node {
    /// Dial every known peer without a link. Returns the number of open links.
    pub async fn connect_peers(&self) -> usize {
        for peer in self.directory.peers() {
            let address = peer.address();
            if self.has_link(&address) {
                continue;
            }
            let dialed = tokio::time::timeout(self.config.dial_timeout(), self.dialer.dial(&peer)).await;
            match dialed {
                Ok(Ok(stream)) => {
                    debug!("[lg-04] Linked to {}", address);
                    self.attach_link(address, stream);
                }
                Ok(Err(e)) => {
                    debug!("[lg-04] {}", e);
                    self.set_connected(&address, false);
                }
                Err(_) => {
                    debug!("[lg-04] Dial {} timed out", address);
                    self.set_connected(&address, false);
                }
            }
        }
        self.linked_peers().len()
    }

    /// One correlated round-trip. `ERR` replies become [`SyncError::Remote`].
    async fn ask(&self, link: &PeerLink, question: Wave) -> Result<WaveBody, SyncError> {
        let reply = match link.exchange(&question, self.config.exchange_timeout()).await {
            Ok(reply) => reply,
            Err(e) => {
                if e.breaks_link() {
                    self.drop_link(link.address());
                }
                return Err(e);
            }
        };
        match reply.body {
            WaveBody::Err { error } => Err(SyncError::Remote {
                peer: link.address().to_string(),
                error,
            }),
            body => Ok(body),
        }
    }

    /// Ask linked peers for the genesis pair until one installs.
    pub async fn sync_roots(&self) -> bool {
        if self.ledger.is_initialized() {
            self.advance(NodeState::on_roots_installed);
            return true;
        }

        for link in self.links() {
            let question = Wave::question(Command::Roots, Vec::new());
            match self.ask(&link, question).await {
                Ok(WaveBody::Roots { users }) => {
                    match decode_roots(&users).and_then(|(a, b)| self.install_roots(a, b)) {
                        Ok(_) => {
                            info!("[lg-04] Roots received from {}", link.address());
                            return true;
                        }
                        Err(e) => warn!("[lg-04] Roots from {} rejected: {}", link.address(), e),
                    }
                }
                Ok(other) => warn!(
                    "[lg-04] Unexpected {} for ROOTS from {}",
                    other.command(),
                    link.address()
                ),
                Err(e) => debug!("[lg-04] ROOTS from {} failed: {}", link.address(), e),
            }
        }
        false
    }

    /// Exchange peer lists with every linked peer. Returns how many peers were new.
    pub async fn sync_peers(&self) -> usize {
        let local = match self.directory.local_descriptor().to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("[lg-04] Cannot encode local descriptor: {}", e);
                return 0;
            }
        };

        let mut learned = 0;
        for link in self.links() {
            let question = Wave::question(Command::Peers, vec![local.clone()]);
            match self.ask(&link, question).await {
                Ok(WaveBody::Peers { peers }) => learned += self.accept_peers(&peers),
                Ok(other) => warn!(
                    "[lg-04] Unexpected {} for PEERS from {}",
                    other.command(),
                    link.address()
                ),
                Err(e) => debug!("[lg-04] PEERS from {} failed: {}", link.address(), e),
            }
        }
        learned
    }

    /// Ping every linked peer. Returns how many answered.
    pub async fn ping_peers(&self) -> usize {
        let mut pongs = 0;
        for link in self.links() {
            match self.ask(&link, Wave::new(WaveBody::Ping)).await {
                Ok(WaveBody::Pong) => {
                    self.set_connected(link.address(), true);
                    pongs += 1;
                }
                Ok(other) => warn!(
                    "[lg-04] Unexpected {} for PING from {}",
                    other.command(),
                    link.address()
                ),
                Err(e) => debug!("[lg-04] PING to {} failed: {}", link.address(), e),
            }
        }
        pongs
    }

    /// Backfill from every linked peer. Returns how many messages were admitted.
    pub async fn backfill(&self) -> usize {
        let mut admitted = 0;
        for link in self.links() {
            match self.backfill_from(&link).await {
                Ok(count) => admitted += count,
                Err(e) => debug!("[lg-04] Backfill from {} stopped: {}", link.address(), e),
            }
        }
        admitted
    }

    /// Page through one peer's history from its cursor.
    ///
    /// Stops on an empty batch, a batch ending at the cursor, or when the
    /// per-cycle question budget is spent. Until a peer has been swept from
    /// start-of-history, an empty batch or a batch with missing references
    /// rewinds the cursor once: the local last message may sit late in the
    /// peer's order with unseen messages before it.
    pub async fn backfill_from(&self, link: &PeerLink) -> Result<usize, SyncError> {
        let address = link.address().to_string();
        let mut cursor = self.peer_cursor(&address);
        let mut admitted = 0;

        for _ in 0..self.config.max_questions_per_cycle {
            let question = Wave::question(Command::Messages, encode_cursor(cursor.last.as_ref()));
            let batch = match self.ask(link, question).await? {
                WaveBody::Messages { messages } => messages,
                other => {
                    return Err(SyncError::UnexpectedReply {
                        peer: address,
                        expected: Command::Messages,
                        got: other.command(),
                    })
                }
            };

            if batch.is_empty() {
                if cursor.swept {
                    break;
                }
                debug!("[lg-04] Sweeping {} from start-of-history", address);
                cursor = PeerCursor::rewound();
                self.set_cursor(&address, cursor);
                continue;
            }

            let report = self.ingest(batch, &address);
            admitted += report.admitted.len();

            if report.gaps > 0 && !cursor.swept {
                debug!("[lg-04] Gap in history from {}, rewinding", address);
                cursor = PeerCursor::rewound();
                self.set_cursor(&address, cursor);
                continue;
            }

            let Some(last) = report.last_id else {
                break;
            };
            if cursor.last == Some(last) {
                break;
            }
            cursor.last = Some(last);
            self.set_cursor(&address, cursor);
        }

        if admitted > 0 {
            info!("[lg-04] Backfilled {} message(s) from {}", admitted, address);
        }
        Ok(admitted)
    }

    /// Run one full cycle.
    pub async fn run_cycle(&self) -> CycleReport {
        let linked = self.connect_peers().await;
        let mut report = CycleReport {
            state: self.state(),
            linked,
            peers_learned: 0,
            pongs: 0,
            messages_admitted: 0,
        };

        if !self.state().has_roots() && !self.sync_roots().await {
            debug!("[lg-04] Still bootstrapping ({} link(s))", linked);
            return report;
        }

        report.peers_learned = self.sync_peers().await;
        report.pongs = self.ping_peers().await;
        report.messages_admitted = self.backfill().await;
        report.state = self.advance(NodeState::on_cycle_completed);

        debug!(
            "[lg-04] Cycle done: state={} links={} pongs={} admitted={}",
            report.state, report.linked, report.pongs, report.messages_admitted
        );
        report
    }

    /// Run cycles forever at the configured interval.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.config.sync_interval());
        loop {
            ticker.tick().await;
            self.run_cycle().await;
        }
    }
}
