//! # Multi-Node Convergence
//!
//! Nodes on an in-memory network reconciling through the real wave
//! exchange: backfill, peer gossip and broadcast.

use std::sync::Arc;
use std::time::Duration;

use lg_01_universe::{Message, Reference, RootIdentity};
use lg_04_wave_sync::{MemoryNetwork, Node, NodeState};
use shared_crypto::SchemeRegistry;

use super::fixtures::{birth, introduce, registry, root_pair, spawn_node, text, text_as};

fn post_chain(node: &Node, registry: &SchemeRegistry, author: &RootIdentity, count: usize) -> Vec<Message> {
    let mut chain: Vec<Message> = Vec::with_capacity(count);
    for i in 0..count {
        let refs = chain.last().map(|m| vec![Reference::to(m)]).unwrap_or_default();
        let message = text(registry, author, refs, &format!("{} {i}", author.user.name)).unwrap();
        node.ledger().add_message(message.clone()).unwrap();
        chain.push(message);
    }
    chain
}

/// Run cycles on every node until a full round admits nothing.
async fn settle(nodes: &[&Arc<Node>]) -> usize {
    for round in 1..=10 {
        let mut admitted = 0;
        for node in nodes {
            admitted += node.run_cycle().await.messages_admitted;
        }
        if admitted == 0 {
            return round;
        }
    }
    panic!("nodes did not settle");
}

#[tokio::test]
async fn test_disjoint_histories_converge() {
    let registry = registry();
    let roots = root_pair(&registry).unwrap();
    let (adam, eve) = (&roots.0, &roots.1);
    let network = MemoryNetwork::new();
    let a = spawn_node(&network, 1, Some(&roots)).unwrap();
    let b = spawn_node(&network, 2, Some(&roots)).unwrap();
    introduce(&a, 2);
    introduce(&b, 1);

    post_chain(&a, &registry, adam, 9);
    let eve_chain = post_chain(&b, &registry, eve, 6);
    // A cross-reference on B's side that A must fetch in order.
    let bridge = text(&registry, eve, vec![Reference::to(&eve_chain[5])], "bridge").unwrap();
    b.ledger().add_message(bridge.clone()).unwrap();

    settle(&[&a, &b]).await;

    for user in [adam.user.id, eve.user.id] {
        assert_eq!(a.ledger().get_max_seq(&user), b.ledger().get_max_seq(&user));
    }
    assert_eq!(a.ledger().get_max_seq(&adam.user.id), 9);
    assert_eq!(a.ledger().get_max_seq(&eve.user.id), 7);
    assert_eq!(a.ledger().message_count(), 16);
    assert_eq!(b.ledger().message_count(), 16);
    assert!(a.ledger().contains_message(&bridge.id));
    assert_eq!(a.state(), NodeState::SteadyState);
}

#[tokio::test]
async fn test_bootstrap_through_gossip_chain() {
    let registry = registry();
    let roots = root_pair(&registry).unwrap();
    let network = MemoryNetwork::new();
    let origin = spawn_node(&network, 1, Some(&roots)).unwrap();
    let relay = spawn_node(&network, 2, None).unwrap();
    let edge = spawn_node(&network, 3, None).unwrap();
    introduce(&relay, 1);
    introduce(&edge, 2);

    post_chain(&origin, &registry, &roots.0, 5);

    // Relay learns roots and history from origin; edge only knows relay.
    relay.run_cycle().await;
    assert_eq!(relay.state(), NodeState::SteadyState);
    assert_eq!(relay.ledger().message_count(), 5);

    edge.run_cycle().await;
    assert_eq!(edge.state(), NodeState::SteadyState);
    assert_eq!(edge.ledger().message_count(), 5);
    assert!(edge.directory().contains("127.0.0.1:1"));

    // Edge dials origin directly on the next cycle.
    let report = edge.run_cycle().await;
    assert_eq!(report.linked, 2);
    assert!(origin.directory().contains("127.0.0.1:3"));
}

#[tokio::test]
async fn test_birth_propagates_and_child_can_post() {
    let registry = registry();
    let roots = root_pair(&registry).unwrap();
    let network = MemoryNetwork::new();
    let a = spawn_node(&network, 1, Some(&roots)).unwrap();
    let b = spawn_node(&network, 2, Some(&roots)).unwrap();
    introduce(&b, 1);

    let (born, child_key) = birth(&registry, &roots, "seth").unwrap();
    let child_id = a.ledger().add_message(born).unwrap().new_user.unwrap();

    b.run_cycle().await;
    let child = b.ledger().get_user_by_id(&child_id).unwrap();
    assert_eq!(child.name, "seth");

    let post = text_as(&registry, child.id, &child_key, Vec::new(), "first words").unwrap();
    b.publish(post.clone()).await.unwrap();
    assert_eq!(b.ledger().get_max_seq(&child_id), 1);

    // A learned B's address when B asked it for peers.
    a.run_cycle().await;
    assert!(a.ledger().contains_message(&post.id));
    assert_eq!(a.ledger().get_max_seq(&child_id), 1);
}

#[tokio::test]
async fn test_broadcast_reaches_peers_without_backfill() {
    let registry = registry();
    let roots = root_pair(&registry).unwrap();
    let network = MemoryNetwork::new();
    let a = spawn_node(&network, 1, Some(&roots)).unwrap();
    let b = spawn_node(&network, 2, Some(&roots)).unwrap();
    let c = spawn_node(&network, 3, Some(&roots)).unwrap();
    introduce(&a, 2);
    introduce(&b, 3);
    a.connect_peers().await;
    b.connect_peers().await;

    let message = text(&registry, &roots.1, Vec::new(), "pass it on").unwrap();
    a.publish(message.clone()).await.unwrap();

    // A → B by broadcast, B → C by re-broadcast of the newly admitted message.
    let mut reached = false;
    for _ in 0..100 {
        if c.ledger().contains_message(&message.id) {
            reached = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(reached);
    assert!(b.ledger().contains_message(&message.id));
}

#[tokio::test]
async fn test_interleaved_branches_agree_on_sequences() {
    let registry = registry();
    let roots = root_pair(&registry).unwrap();
    let adam = &roots.0;
    let network = MemoryNetwork::new();
    let x = spawn_node(&network, 1, Some(&roots)).unwrap();
    let y = spawn_node(&network, 2, Some(&roots)).unwrap();
    introduce(&y, 1);

    let a1 = text(&registry, adam, Vec::new(), "a1").unwrap();
    x.ledger().add_message(a1.clone()).unwrap();
    y.run_cycle().await;
    assert!(y.ledger().contains_message(&a1.id));

    // Adam starts a second branch on Y while extending the first on X.
    let a3 = text(&registry, adam, Vec::new(), "a3").unwrap();
    let a4 = text(&registry, adam, vec![Reference::to(&a3)], "a4").unwrap();
    y.ledger().add_message(a3.clone()).unwrap();
    y.ledger().add_message(a4.clone()).unwrap();
    let a2 = text(&registry, adam, vec![Reference::to(&a1)], "a2").unwrap();
    x.ledger().add_message(a2.clone()).unwrap();

    introduce(&x, 2);
    settle(&[&x, &y]).await;

    assert_eq!(x.ledger().message_count(), 4);
    assert_eq!(y.ledger().message_count(), 4);
    for message in [&a1, &a2, &a3, &a4] {
        let on_x = x.ledger().read(|u| u.seq_of(&message.id)).flatten();
        let on_y = y.ledger().read(|u| u.seq_of(&message.id)).flatten();
        assert!(on_x.is_some());
        assert_eq!(on_x, on_y);
    }
    assert_eq!(x.ledger().get_max_seq(&adam.user.id), 2);
    assert_eq!(y.ledger().get_max_seq(&adam.user.id), 2);

    let viewer = roots.1.user.id;
    let on_x = x.ledger().get_user_info(&adam.user.id, &viewer).unwrap();
    let on_y = y.ledger().get_user_info(&adam.user.id, &viewer).unwrap();
    assert_eq!(on_x, on_y);
    assert_eq!(on_x.authored_messages, 4);
}
