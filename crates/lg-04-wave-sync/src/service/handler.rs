//! # Inbound Dispatch
//!
//! Receive loop for one connection plus the per-command handlers. Every
//! reply reuses the `wave_id` of the wave it answers; any handler failure is
//! reported to the sender as a correlated `ERR`.

use super::node::Node;
use crate::domain::{
    decode_cursor, decode_roots, encode_messages, encode_peers, encode_roots, SyncError,
};
use crate::ports::BoxedStream;
use lg_02_wave_codec::{read_wave, write_wave, CodecError, Command, Wave, WaveBody};
use lg_03_peer_directory::PeerDescriptor;
use shared_types::short_hex;
use std::sync::Arc;
use tracing::{debug, warn};

const UNKNOWN_ORIGIN: &str = "unknown";

impl Node {
    /// Serve one connection until the peer closes it or the transport fails.
    ///
    /// `remote_host` is the transport-observed host of the peer; it replaces
    /// the host a `QUESTION(PEERS)` requester advertises for itself.
    pub async fn serve_connection(self: Arc<Self>, mut stream: BoxedStream, remote_host: Option<String>) {
        let origin = remote_host.as_deref().unwrap_or(UNKNOWN_ORIGIN).to_string();
        debug!("[lg-04] Serving connection from {}", origin);

        loop {
            let reply = match read_wave(&mut stream).await {
                Ok(wave) => self.handle_wave(wave, remote_host.as_deref()).await,
                Err(CodecError::Closed) => {
                    debug!("[lg-04] Connection from {} closed", origin);
                    break;
                }
                Err(e) if e.is_fatal() => {
                    warn!("[lg-04] Connection from {} failed: {}", origin, e);
                    break;
                }
                Err(e) => {
                    warn!("[lg-04] Bad wave from {}: {}", origin, e);
                    e.wave_id().map(|wave_id| Wave::error(wave_id, e.to_string()))
                }
            };

            if let Some(reply) = reply {
                if let Err(e) = write_wave(&mut stream, &reply).await {
                    warn!("[lg-04] Reply to {} failed: {}", origin, e);
                    break;
                }
            }
        }
    }

    /// Handle one inbound wave, returning the reply to write back (if any).
    pub async fn handle_wave(self: &Arc<Self>, wave: Wave, remote_host: Option<&str>) -> Option<Wave> {
        let origin = remote_host.unwrap_or(UNKNOWN_ORIGIN);
        let wave_id = wave.wave_id;
        let command = wave.command();

        let outcome = match wave.body {
            WaveBody::Ping => Ok(Some(WaveBody::Pong)),
            WaveBody::Pong => {
                debug!("[lg-04] PONG from {}", origin);
                Ok(None)
            }
            WaveBody::Question { topic, args } => {
                self.answer(topic, &args, remote_host).map(Some)
            }
            WaveBody::Roots { users } => self.accept_roots(&users).map(|_| None),
            WaveBody::Peers { peers } => {
                let learned = self.accept_peers(&peers);
                debug!("[lg-04] Learned {} peer(s) from {}", learned, origin);
                Ok(None)
            }
            WaveBody::Messages { messages } => self.accept_messages(messages, origin).map(|_| None),
            WaveBody::Err { error } => {
                warn!(
                    "[lg-04] {} reported error for wave {}: {}",
                    origin,
                    short_hex(&wave_id),
                    error
                );
                Ok(None)
            }
        };

        match outcome {
            Ok(body) => body.map(|body| Wave::reply(wave_id, body)),
            Err(e) => {
                warn!("[lg-04] {} from {} failed: {}", command, origin, e);
                Some(Wave::error(wave_id, e.to_string()))
            }
        }
    }

    fn answer(
        &self,
        topic: Command,
        args: &[Vec<u8>],
        remote_host: Option<&str>,
    ) -> Result<WaveBody, SyncError> {
        match topic {
            Command::Roots => {
                let (a, b) = self.ledger.roots().ok_or(SyncError::NotReady)?;
                Ok(WaveBody::Roots {
                    users: encode_roots(&a, &b)?,
                })
            }
            Command::Peers => {
                let mut known = self.directory.peers();
                known.push(self.directory.local_descriptor().clone());
                let body = WaveBody::Peers {
                    peers: encode_peers(&known)?,
                };
                self.register_requester(args.first(), remote_host);
                Ok(body)
            }
            Command::Messages => {
                if !self.ledger.is_initialized() {
                    return Err(SyncError::NotReady);
                }
                let cursor = decode_cursor(args)?;
                let batch = self
                    .ledger
                    .messages_after(cursor.as_ref(), self.config.max_messages_per_wave);
                Ok(WaveBody::Messages {
                    messages: encode_messages(&batch)?,
                })
            }
            other => Err(SyncError::UnsupportedTopic(other)),
        }
    }

    fn register_requester(&self, advertised: Option<&Vec<u8>>, remote_host: Option<&str>) {
        let Some(bytes) = advertised else {
            return;
        };
        let mut descriptor = match PeerDescriptor::from_bytes(bytes) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                debug!("[lg-04] Ignoring requester descriptor: {}", e);
                return;
            }
        };
        if let Some(host) = remote_host {
            descriptor.host = host.to_string();
        }
        if self.directory.merge([descriptor.clone()]) > 0 {
            debug!("[lg-04] Registered requester {}", descriptor);
        }
    }

    fn accept_roots(&self, users: &[Vec<u8>; 2]) -> Result<(), SyncError> {
        let (a, b) = decode_roots(users)?;
        self.install_roots(a, b)?;
        Ok(())
    }

    /// Merge gossiped descriptors. Returns how many were new.
    pub(super) fn accept_peers(&self, peers: &[Vec<u8>]) -> usize {
        let decoded = peers
            .iter()
            .filter_map(|bytes| match PeerDescriptor::from_bytes(bytes) {
                Ok(descriptor) => Some(descriptor),
                Err(e) => {
                    debug!("[lg-04] Skipping peer descriptor: {}", e);
                    None
                }
            })
            .collect::<Vec<_>>();
        self.directory.merge(decoded)
    }

    fn accept_messages(self: &Arc<Self>, batch: Vec<Vec<u8>>, origin: &str) -> Result<(), SyncError> {
        let total = batch.len();
        let report = self.ingest(batch, origin);

        if !report.admitted.is_empty() {
            let node = Arc::clone(self);
            let fresh = report.admitted;
            tokio::spawn(async move {
                node.broadcast(&fresh).await;
            });
        }

        let rejected = report.rejected + report.gaps;
        if rejected > 0 {
            return Err(SyncError::BatchRejected { rejected, total });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryNetwork;
    use crate::domain::{decode_message, encode_cursor, NodeState};
    use crate::service::fixtures::{chain, genesis, node, text};
    use lg_02_wave_codec::Envelope;
    use lg_01_universe::Message;
    use tokio::io::AsyncWriteExt;

    fn messages_of(reply: Option<Wave>) -> Vec<Message> {
        match reply.map(|w| w.body) {
            Some(WaveBody::Messages { messages }) => messages
                .iter()
                .map(|bytes| decode_message(bytes).unwrap())
                .collect(),
            other => panic!("expected MESSAGES, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ping_answered_with_correlated_pong() {
        let network = MemoryNetwork::new();
        let a = node(&network, 1, None);
        let ping = Wave::new(WaveBody::Ping);

        let reply = a.handle_wave(ping.clone(), None).await.unwrap();
        assert_eq!(reply.wave_id, ping.wave_id);
        assert_eq!(reply.body, WaveBody::Pong);
    }

    #[tokio::test]
    async fn test_roots_question_before_and_after_genesis() {
        let network = MemoryNetwork::new();
        let roots = genesis();
        let empty = node(&network, 1, None);
        let seeded = node(&network, 2, Some(&roots));
        let question = Wave::question(Command::Roots, Vec::new());

        let reply = empty.handle_wave(question.clone(), None).await.unwrap();
        assert_eq!(reply.wave_id, question.wave_id);
        assert!(matches!(reply.body, WaveBody::Err { .. }));

        let reply = seeded.handle_wave(question, None).await.unwrap();
        let WaveBody::Roots { users } = reply.body else {
            panic!("expected ROOTS");
        };
        let (a, b) = decode_roots(&users).unwrap();
        assert_eq!(a.id, roots.0.user.id);
        assert_eq!(b.id, roots.1.user.id);
    }

    #[tokio::test]
    async fn test_messages_question_pages_in_admission_order() {
        let network = MemoryNetwork::new();
        let roots = genesis();
        let a = node(&network, 1, Some(&roots));
        let posted = chain(&a, &roots.0, 6);

        let first = messages_of(
            a.handle_wave(Wave::question(Command::Messages, encode_cursor(None)), None)
                .await,
        );
        assert_eq!(first, posted[..4].to_vec());

        let rest = messages_of(
            a.handle_wave(
                Wave::question(Command::Messages, encode_cursor(Some(&posted[3].id))),
                None,
            )
            .await,
        );
        assert_eq!(rest, posted[4..].to_vec());

        let unknown = messages_of(
            a.handle_wave(
                Wave::question(Command::Messages, encode_cursor(Some(&[9u8; 32]))),
                None,
            )
            .await,
        );
        assert_eq!(unknown, posted[..4].to_vec());

        let tail = messages_of(
            a.handle_wave(
                Wave::question(Command::Messages, encode_cursor(Some(&posted[5].id))),
                None,
            )
            .await,
        );
        assert!(tail.is_empty());
    }

    #[tokio::test]
    async fn test_peers_question_registers_requester_at_observed_host() {
        let network = MemoryNetwork::new();
        let a = node(&network, 1, None);
        a.directory()
            .add_peer(PeerDescriptor::new("10.0.0.7", 7000))
            .unwrap();

        let advertised = PeerDescriptor::new("10.9.9.9", 7100).to_bytes().unwrap();
        let reply = a
            .handle_wave(
                Wave::question(Command::Peers, vec![advertised]),
                Some("192.168.1.5"),
            )
            .await
            .unwrap();

        let WaveBody::Peers { peers } = reply.body else {
            panic!("expected PEERS");
        };
        let listed: Vec<String> = peers
            .iter()
            .map(|bytes| PeerDescriptor::from_bytes(bytes).unwrap().address())
            .collect();
        assert!(listed.contains(&"10.0.0.7:7000".to_string()));
        assert!(listed.contains(&"127.0.0.1:1".to_string()));

        assert!(a.directory().contains("192.168.1.5:7100"));
        assert!(!a.directory().contains("10.9.9.9:7100"));
    }

    #[tokio::test]
    async fn test_inbound_roots_install_and_conflict() {
        let network = MemoryNetwork::new();
        let roots = genesis();
        let a = node(&network, 1, None);
        let users = encode_roots(&roots.0.user, &roots.1.user).unwrap();

        let reply = a
            .handle_wave(Wave::new(WaveBody::Roots { users: users.clone() }), None)
            .await;
        assert!(reply.is_none());
        assert_eq!(a.state(), NodeState::RootsSynced);

        // Same pair again is a no-op.
        let reply = a.handle_wave(Wave::new(WaveBody::Roots { users }), None).await;
        assert!(reply.is_none());

        let other = genesis();
        let conflicting = encode_roots(&other.0.user, &other.1.user).unwrap();
        let wave = Wave::new(WaveBody::Roots { users: conflicting });
        let reply = a.handle_wave(wave.clone(), None).await.unwrap();
        assert_eq!(reply.wave_id, wave.wave_id);
        assert!(matches!(reply.body, WaveBody::Err { .. }));
        assert_eq!(a.ledger().roots().unwrap().0.id, roots.0.user.id);
    }

    #[tokio::test]
    async fn test_inbound_messages_duplicates_are_silent() {
        let network = MemoryNetwork::new();
        let roots = genesis();
        let a = node(&network, 1, Some(&roots));
        let message = text(&a, &roots.0, Vec::new(), "hello");
        let batch = encode_messages(&[message.clone()]).unwrap();

        let reply = a
            .handle_wave(Wave::new(WaveBody::Messages { messages: batch.clone() }), None)
            .await;
        assert!(reply.is_none());
        assert!(a.ledger().contains_message(&message.id));

        let reply = a
            .handle_wave(Wave::new(WaveBody::Messages { messages: batch }), None)
            .await;
        assert!(reply.is_none());
        assert_eq!(a.ledger().message_count(), 1);
    }

    #[tokio::test]
    async fn test_inbound_messages_bad_entries_reported_good_ones_kept() {
        let network = MemoryNetwork::new();
        let roots = genesis();
        let a = node(&network, 1, Some(&roots));
        let good = text(&a, &roots.1, Vec::new(), "kept");
        let mut batch = encode_messages(&[good.clone()]).unwrap();
        batch.push(vec![0xde, 0xad]);

        let wave = Wave::new(WaveBody::Messages { messages: batch });
        let reply = a.handle_wave(wave.clone(), Some("10.0.0.2")).await.unwrap();
        assert_eq!(reply.wave_id, wave.wave_id);
        let WaveBody::Err { error } = reply.body else {
            panic!("expected ERR");
        };
        assert!(error.contains("1 of 2"));
        assert!(a.ledger().contains_message(&good.id));
    }

    #[tokio::test]
    async fn test_err_wave_is_logged_only() {
        let network = MemoryNetwork::new();
        let a = node(&network, 1, None);
        let reply = a
            .handle_wave(Wave::error([1u8; 32], "boom"), Some("10.0.0.2"))
            .await;
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn test_receive_loop_survives_bad_wave_and_ends_on_close() {
        let network = MemoryNetwork::new();
        let a = node(&network, 1, None);
        let (mut client, server) = tokio::io::duplex(64 * 1024);
        let served = tokio::spawn(Arc::clone(&a).serve_connection(Box::new(server), None));

        let bogus = Envelope {
            wave_id: [5u8; 32],
            command: 999,
            payload: Vec::new(),
        };
        let body = bincode::serialize(&bogus).unwrap();
        client
            .write_all(&(body.len() as u32).to_be_bytes())
            .await
            .unwrap();
        client.write_all(&body).await.unwrap();

        let reply = read_wave(&mut client).await.unwrap();
        assert_eq!(reply.wave_id, [5u8; 32]);
        assert!(matches!(reply.body, WaveBody::Err { .. }));

        let ping = Wave::new(WaveBody::Ping);
        write_wave(&mut client, &ping).await.unwrap();
        let reply = read_wave(&mut client).await.unwrap();
        assert_eq!(reply.wave_id, ping.wave_id);
        assert_eq!(reply.body, WaveBody::Pong);

        drop(client);
        tokio::time::timeout(std::time::Duration::from_secs(1), served)
            .await
            .unwrap()
            .unwrap();
    }
}
