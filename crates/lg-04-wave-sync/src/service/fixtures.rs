//! Shared test setup.

use super::node::Node;
use crate::adapters::MemoryNetwork;
use crate::config::SyncConfig;
use lg_01_universe::{
    generate_root_pair, Ledger, Message, MessageValue, Reference, RootIdentity, UniverseConfig,
};
use lg_03_peer_directory::{PeerDescriptor, PeerDirectory};
use shared_crypto::{SchemeRegistry, ED25519_SOURCE, SINGLE_KEY};
use std::sync::Arc;

pub(crate) fn genesis() -> (RootIdentity, RootIdentity) {
    let registry = SchemeRegistry::default();
    generate_root_pair(&registry, ED25519_SOURCE, SINGLE_KEY, 1, ("adam", "eve")).unwrap()
}

/// Node registered on `network` at `127.0.0.1:port`, optionally with roots installed.
pub(crate) fn node(
    network: &Arc<MemoryNetwork>,
    port: u16,
    roots: Option<&(RootIdentity, RootIdentity)>,
) -> Arc<Node> {
    let ledger = Arc::new(Ledger::in_memory(
        Arc::new(SchemeRegistry::default()),
        UniverseConfig::for_testing(),
    ));
    if let Some((a, b)) = roots {
        ledger.install_roots(a.user.clone(), b.user.clone()).unwrap();
    }
    let directory = Arc::new(PeerDirectory::new(PeerDescriptor::new("127.0.0.1", port)));
    let node = Arc::new(Node::new(
        SyncConfig::for_testing(),
        ledger,
        directory,
        Arc::new(network.dialer("127.0.0.1")),
    ));
    network.register(&node);
    node
}

pub(crate) fn text(node: &Node, who: &RootIdentity, refs: Vec<Reference>, body: &str) -> Message {
    Message::create(
        who.user.id,
        refs,
        MessageValue::text(body),
        &who.key,
        node.ledger().registry(),
    )
    .unwrap()
}

/// Admit a chain of `count` messages by `who` directly into the ledger.
pub(crate) fn chain(node: &Node, who: &RootIdentity, count: usize) -> Vec<Message> {
    let mut out: Vec<Message> = Vec::with_capacity(count);
    for i in 0..count {
        let refs = out.last().map(|m| vec![Reference::to(m)]).unwrap_or_default();
        let message = text(node, who, refs, &format!("{} #{i}", who.user.name));
        node.ledger().add_message(message.clone()).unwrap();
        out.push(message);
    }
    out
}
