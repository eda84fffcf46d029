//! # Universe Scenario
//!
//! Genesis, text, reply, duplicate, birth, witness: the full admission path
//! through the `Ledger`, including a restart from the store.

use std::sync::Arc;

use lg_01_universe::{
    derive_gender, InMemoryUniverseStore, Ledger, Reference, UniverseConfig, UniverseError,
    UniverseStore,
};

use super::fixtures::{birth, registry, root_pair, text};

#[test]
fn test_end_to_end_universe() {
    let registry = registry();
    let roots = root_pair(&registry).unwrap();
    let (adam, eve) = (&roots.0, &roots.1);
    let ledger = Ledger::in_memory(registry.clone(), UniverseConfig::default());

    assert!(ledger.install_roots(adam.user.clone(), eve.user.clone()).unwrap());

    let first = text(&registry, adam, Vec::new(), "in the beginning").unwrap();
    ledger.add_message(first.clone()).unwrap();
    assert_eq!(ledger.get_max_seq(&adam.user.id), 1);

    let reply = text(&registry, eve, vec![Reference::to(&first)], "hello adam").unwrap();
    ledger.add_message(reply).unwrap();
    assert_eq!(ledger.get_max_seq(&adam.user.id), 1);
    assert_eq!(ledger.get_max_seq(&eve.user.id), 1);

    let before = ledger.message_count();
    assert_eq!(
        ledger.add_message(first.clone()),
        Err(UniverseError::DuplicateMessage(first.id))
    );
    assert_eq!(ledger.message_count(), before);

    let (born, _child_key) = birth(&registry, &roots, "cain").unwrap();
    let admission = ledger.add_message(born).unwrap();
    let child_id = admission.new_user.unwrap();

    let child = ledger.get_user_by_id(&child_id).unwrap();
    assert_eq!(child.name, "cain");
    assert_eq!(child.gender().unwrap(), derive_gender(&child.auth).unwrap());
    assert_eq!(child.compute_id().unwrap(), child_id);

    let info = ledger.get_user_info(&child_id, &adam.user.id).unwrap();
    assert!(!info.is_root);
    assert_eq!(info.max_seq, 0);
}

#[test]
fn test_birth_needs_both_parents() {
    let registry = registry();
    let roots = root_pair(&registry).unwrap();
    let ledger = Ledger::in_memory(registry.clone(), UniverseConfig::default());
    ledger
        .install_roots(roots.0.user.clone(), roots.1.user.clone())
        .unwrap();

    let (mut born, _) = birth(&registry, &roots, "abel").unwrap();
    if let lg_01_universe::MessageValue::Birth(content) = &mut born.value {
        content.parents.pop();
    }
    born.id = born.compute_id().unwrap();
    born.sign(&roots.0.key, &registry).unwrap();

    assert!(matches!(
        ledger.add_message(born),
        Err(UniverseError::InvalidBirthContent(_))
    ));
    assert_eq!(ledger.message_count(), 0);
}

#[test]
fn test_witness_lifts_recognized_seq_and_survives_restart() {
    let registry = registry();
    let roots = root_pair(&registry).unwrap();
    let (adam, eve) = (&roots.0, &roots.1);
    let store = Arc::new(InMemoryUniverseStore::new());
    let config = UniverseConfig::for_testing();
    let ledger = Ledger::new(store.clone(), registry.clone(), config.clone());
    ledger
        .install_roots(adam.user.clone(), eve.user.clone())
        .unwrap();

    // Adam runs past the unwitnessed allowance.
    let mut last = text(&registry, adam, Vec::new(), "a0").unwrap();
    ledger.add_message(last.clone()).unwrap();
    for i in 1..20 {
        last = text(&registry, adam, vec![Reference::to(&last)], &format!("a{i}")).unwrap();
        ledger.add_message(last.clone()).unwrap();
    }
    assert_eq!(ledger.get_max_seq(&adam.user.id), 20);
    let capped = ledger.get_recognized_seq(&adam.user.id);
    assert!(capped < 20);

    // Eve references Adam's tip, then the tip becomes an anchor.
    let seen = text(&registry, eve, vec![Reference::to(&last)], "seen").unwrap();
    ledger.add_message(seen).unwrap();
    assert_eq!(ledger.get_recognized_seq(&eve.user.id), 1);
    assert!(ledger.add_space_time_witness(&last.id).unwrap() >= 2);

    assert_eq!(ledger.get_recognized_seq(&adam.user.id), 20);
    let eve_recognized = ledger.get_recognized_seq(&eve.user.id);
    assert_eq!(eve_recognized, 20);
    assert_eq!(ledger.get_max_seq(&eve.user.id), 1);

    assert!(matches!(
        ledger.add_space_time_witness(&[0xab; 32]),
        Err(UniverseError::MessageUnknown(_))
    ));

    let restored = Ledger::restore(store.clone(), registry, config).unwrap();
    assert_eq!(restored.message_count(), store.message_count().unwrap());
    assert_eq!(restored.get_max_seq(&adam.user.id), 20);
    assert_eq!(
        restored.get_recognized_seq(&adam.user.id),
        ledger.get_recognized_seq(&adam.user.id)
    );
    assert_eq!(restored.get_recognized_seq(&eve.user.id), eve_recognized);
}
