//! # Ledger
//!
//! Thread-safe owner of the universe. Every mutation, local or remote, goes
//! through the write lock here and is mirrored to the store before it is
//! applied in memory, so a store failure leaves the universe untouched.

use crate::config::UniverseConfig;
use crate::domain::{
    Admission, Message, MessageId, StoreError, Universe, UniverseError, User, UserId, UserInfo,
};
use crate::ports::{InMemoryUniverseStore, UniverseStore};
use parking_lot::RwLock;
use shared_crypto::SchemeRegistry;
use shared_types::short_hex;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared handle to the node's universe.
pub struct Ledger {
    universe: RwLock<Option<Universe>>,
    store: Arc<dyn UniverseStore>,
    registry: Arc<SchemeRegistry>,
    config: UniverseConfig,
}

impl Ledger {
    /// Uninitialized ledger over `store`.
    pub fn new(
        store: Arc<dyn UniverseStore>,
        registry: Arc<SchemeRegistry>,
        config: UniverseConfig,
    ) -> Self {
        Self {
            universe: RwLock::new(None),
            store,
            registry,
            config,
        }
    }

    /// Uninitialized ledger with an in-memory store.
    pub fn in_memory(registry: Arc<SchemeRegistry>, config: UniverseConfig) -> Self {
        Self::new(Arc::new(InMemoryUniverseStore::new()), registry, config)
    }

    /// Rebuild the universe from whatever `store` holds.
    pub fn restore(
        store: Arc<dyn UniverseStore>,
        registry: Arc<SchemeRegistry>,
        config: UniverseConfig,
    ) -> Result<Self, UniverseError> {
        let Some((a, b)) = store.get_roots()? else {
            info!("[lg-01] No stored roots, starting uninitialized");
            return Ok(Self::new(store, registry, config));
        };

        let mut universe = Universe::new(a, b, registry.clone(), &config)?;
        let count = store.message_count()?;
        for index in 0..count {
            let message = store.get_message_at(index)?.ok_or_else(|| {
                StoreError::Corrupted(format!("missing message at position {index}"))
            })?;
            universe.add_message(message)?;
        }
        for id in store.witnesses()? {
            universe.add_space_time_witness(&id)?;
        }

        info!(
            "[lg-01] Restored universe: {} users, {} messages",
            universe.user_count(),
            universe.message_count()
        );

        let ledger = Self::new(store, registry, config);
        *ledger.universe.write() = Some(universe);
        Ok(ledger)
    }

    /// Signature schemes this ledger accepts.
    pub fn registry(&self) -> &Arc<SchemeRegistry> {
        &self.registry
    }

    /// Universe configuration.
    pub fn config(&self) -> &UniverseConfig {
        &self.config
    }

    /// Whether roots have been installed.
    pub fn is_initialized(&self) -> bool {
        self.universe.read().is_some()
    }

    /// Install the genesis pair.
    ///
    /// Returns `Ok(false)` if the same pair is already installed.
    pub fn install_roots(&self, a: User, b: User) -> Result<bool, UniverseError> {
        let mut guard = self.universe.write();
        if let Some(universe) = guard.as_ref() {
            if universe.has_roots(&a.id, &b.id) {
                return Ok(false);
            }
            return Err(UniverseError::AlreadyInitialized);
        }

        let universe = Universe::new(a.clone(), b.clone(), self.registry.clone(), &self.config)?;
        self.store.put_roots(&a, &b)?;
        *guard = Some(universe);

        info!(
            "[lg-01] Roots installed: {} ({}), {} ({})",
            a.name,
            short_hex(&a.id),
            b.name,
            short_hex(&b.id)
        );
        Ok(true)
    }

    /// Validate, mirror and admit a message.
    pub fn add_message(&self, message: Message) -> Result<Admission, UniverseError> {
        let mut guard = self.universe.write();
        let universe = guard.as_mut().ok_or(UniverseError::NotInitialized)?;

        let prepared = universe.prepare(&message)?;
        self.store.put_message(&message, prepared.new_user())?;
        let admission = universe.commit(message, prepared);

        debug!(
            "[lg-01] Admitted message {} from {} (seq {})",
            short_hex(&admission.message_id),
            short_hex(&admission.sender_id),
            admission.seq
        );
        if let Some(child) = admission.new_user {
            info!("[lg-01] New user born: {}", short_hex(&child));
        }
        Ok(admission)
    }

    /// Declare a space-time witness anchor.
    pub fn add_space_time_witness(&self, message_id: &MessageId) -> Result<usize, UniverseError> {
        let mut guard = self.universe.write();
        let universe = guard.as_mut().ok_or(UniverseError::NotInitialized)?;
        if universe.get_message_by_id(message_id).is_none() {
            return Err(UniverseError::MessageUnknown(*message_id));
        }

        self.store.put_witness(message_id)?;
        let credited = universe.add_space_time_witness(message_id)?;
        debug!(
            "[lg-01] Witness {} credited {} messages",
            short_hex(message_id),
            credited
        );
        Ok(credited)
    }

    /// Run `f` against the universe under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&Universe) -> R) -> Option<R> {
        self.universe.read().as_ref().map(f)
    }

    /// Genesis pair.
    pub fn roots(&self) -> Option<(User, User)> {
        self.read(|u| {
            let [a, b] = u.roots();
            (a.clone(), b.clone())
        })
    }

    /// Lookup a user.
    pub fn get_user_by_id(&self, id: &UserId) -> Option<User> {
        self.read(|u| u.get_user_by_id(id).cloned()).flatten()
    }

    /// Lookup a message.
    pub fn get_message_by_id(&self, id: &MessageId) -> Option<Message> {
        self.read(|u| u.get_message_by_id(id).cloned()).flatten()
    }

    /// Whether a message is admitted.
    pub fn contains_message(&self, id: &MessageId) -> bool {
        self.read(|u| u.get_message_by_id(id).is_some())
            .unwrap_or(false)
    }

    /// Public record of `target_id` as seen by `viewer_id`.
    pub fn get_user_info(&self, target_id: &UserId, viewer_id: &UserId) -> Option<UserInfo> {
        self.read(|u| u.get_user_info(target_id, viewer_id)).flatten()
    }

    /// Highest seq of `user_id`'s messages; 0 if none or uninitialized.
    pub fn get_max_seq(&self, user_id: &UserId) -> u64 {
        self.read(|u| u.get_max_seq(user_id)).unwrap_or(0)
    }

    /// Recognized seq of `user_id`.
    pub fn get_recognized_seq(&self, user_id: &UserId) -> u64 {
        self.read(|u| u.get_recognized_seq(user_id)).unwrap_or(0)
    }

    /// Most recently admitted message id.
    pub fn last_message_id(&self) -> Option<MessageId> {
        self.read(|u| u.last_message_id()).flatten()
    }

    /// Number of admitted messages.
    pub fn message_count(&self) -> usize {
        self.read(|u| u.message_count()).unwrap_or(0)
    }

    /// Up to `limit` messages after `last_known` (unknown id means start-of-history).
    pub fn messages_after(&self, last_known: Option<&MessageId>, limit: usize) -> Vec<Message> {
        self.read(|u| u.messages_after(last_known, limit))
            .unwrap_or_default()
    }
}
