//! Shared setup for the scenarios.

use std::sync::Arc;

use lg_01_universe::{
    generate_root_pair, BirthContent, Ledger, Message, MessageValue, Reference, RootIdentity,
    UniverseConfig, UniverseError, UserId,
};
use lg_03_peer_directory::{PeerDescriptor, PeerDirectory};
use lg_04_wave_sync::{MemoryNetwork, Node, SyncConfig};
use shared_crypto::{PrivateKey, SchemeRegistry, ED25519_SOURCE, SECP256K1_SOURCE, SINGLE_KEY};

/// Loopback host every in-memory node shares.
pub const HOST: &str = "127.0.0.1";

/// Registry with every built-in engine.
pub fn registry() -> Arc<SchemeRegistry> {
    Arc::new(SchemeRegistry::with_defaults())
}

/// Opposite-gender root pair.
pub fn root_pair(registry: &SchemeRegistry) -> Result<(RootIdentity, RootIdentity), UniverseError> {
    generate_root_pair(registry, ED25519_SOURCE, SINGLE_KEY, 1, ("adam", "eve"))
}

/// Signed text message by a root.
pub fn text(
    registry: &SchemeRegistry,
    author: &RootIdentity,
    references: Vec<Reference>,
    body: &str,
) -> Result<Message, UniverseError> {
    text_as(registry, author.user.id, &author.key, references, body)
}

/// Signed text message by any user.
pub fn text_as(
    registry: &SchemeRegistry,
    sender_id: UserId,
    key: &PrivateKey,
    references: Vec<Reference>,
    body: &str,
) -> Result<Message, UniverseError> {
    Message::create(sender_id, references, MessageValue::text(body), key, registry)
}

/// Birth of `name` approved by both roots, posted by the first. Returns the
/// message and the child's private key.
pub fn birth(
    registry: &SchemeRegistry,
    roots: &(RootIdentity, RootIdentity),
    name: &str,
) -> Result<(Message, PrivateKey), UniverseError> {
    let (child_key, child_auth) = registry.generate(SECP256K1_SOURCE, SINGLE_KEY, 1)?;
    let mut content = BirthContent::new(name, "born in a test", child_auth);
    content.sign_by_parent(roots.0.user.id, &roots.0.key, registry)?;
    content.sign_by_parent(roots.1.user.id, &roots.1.key, registry)?;
    let message = Message::create(
        roots.0.user.id,
        Vec::new(),
        MessageValue::Birth(content),
        &roots.0.key,
        registry,
    )?;
    Ok((message, child_key))
}

/// Node on `network` at `HOST:port`, roots installed when given.
pub fn spawn_node(
    network: &Arc<MemoryNetwork>,
    port: u16,
    roots: Option<&(RootIdentity, RootIdentity)>,
) -> Result<Arc<Node>, UniverseError> {
    let ledger = Arc::new(Ledger::in_memory(registry(), UniverseConfig::for_testing()));
    if let Some((a, b)) = roots {
        ledger.install_roots(a.user.clone(), b.user.clone())?;
    }
    let directory = Arc::new(PeerDirectory::new(PeerDescriptor::new(HOST, port)));
    let node = Arc::new(Node::new(
        SyncConfig::for_testing(),
        ledger,
        directory,
        Arc::new(network.dialer(HOST)),
    ));
    network.register(&node);
    Ok(node)
}

/// Let `node` know about the peer at `HOST:port`.
pub fn introduce(node: &Node, port: u16) {
    node.directory().merge([PeerDescriptor::new(HOST, port)]);
}
