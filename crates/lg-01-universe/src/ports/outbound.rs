//! # Outbound Ports
//!
//! Storage collaborator. The in-memory universe is authoritative; the store
//! is a write-through mirror used to restore state on restart.

use crate::domain::{Message, MessageId, StoreError, User, UserId};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Persistent mirror of users, messages and witness anchors.
///
/// Lookups return `Ok(None)` when absent; `Err` is reserved for backend
/// failures.
pub trait UniverseStore: Send + Sync {
    /// Persist the genesis pair (and both users).
    fn put_roots(&self, a: &User, b: &User) -> Result<(), StoreError>;

    /// Genesis pair, if one was stored.
    fn get_roots(&self) -> Result<Option<(User, User)>, StoreError>;

    /// Lookup a user.
    fn get_user(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Append a message, together with the user its birth payload created.
    /// Storing an already stored message is a no-op.
    fn put_message(&self, message: &Message, born: Option<&User>) -> Result<(), StoreError>;

    /// Lookup a message.
    fn get_message(&self, id: &MessageId) -> Result<Option<Message>, StoreError>;

    /// Message at insertion position `index`.
    fn get_message_at(&self, index: usize) -> Result<Option<Message>, StoreError>;

    /// Number of stored messages.
    fn message_count(&self) -> Result<usize, StoreError>;

    /// Most recently stored message.
    fn last_message(&self) -> Result<Option<Message>, StoreError>;

    /// Record a witness anchor.
    fn put_witness(&self, id: &MessageId) -> Result<(), StoreError>;

    /// Witness anchors in declaration order.
    fn witnesses(&self) -> Result<Vec<MessageId>, StoreError>;
}

// =============================================================================
// In-memory adapter
// =============================================================================

#[derive(Default)]
struct StoreState {
    roots: Option<(UserId, UserId)>,
    users: HashMap<UserId, User>,
    messages: HashMap<MessageId, Message>,
    order: Vec<MessageId>,
    witnesses: Vec<MessageId>,
}

/// In-memory store for tests and ephemeral nodes.
#[derive(Default)]
pub struct InMemoryUniverseStore {
    state: RwLock<StoreState>,
}

impl InMemoryUniverseStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users (roots included).
    pub fn user_count(&self) -> usize {
        self.state.read().users.len()
    }
}

impl UniverseStore for InMemoryUniverseStore {
    fn put_roots(&self, a: &User, b: &User) -> Result<(), StoreError> {
        let mut state = self.state.write();
        state.users.insert(a.id, a.clone());
        state.users.insert(b.id, b.clone());
        state.roots = Some((a.id, b.id));
        Ok(())
    }

    fn get_roots(&self) -> Result<Option<(User, User)>, StoreError> {
        let state = self.state.read();
        let Some((a, b)) = state.roots else {
            return Ok(None);
        };
        match (state.users.get(&a), state.users.get(&b)) {
            (Some(a), Some(b)) => Ok(Some((a.clone(), b.clone()))),
            _ => Err(StoreError::Corrupted("root user record missing".into())),
        }
    }

    fn get_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().users.get(id).cloned())
    }

    fn put_message(&self, message: &Message, born: Option<&User>) -> Result<(), StoreError> {
        let mut state = self.state.write();
        if state.messages.contains_key(&message.id) {
            return Ok(());
        }
        if let Some(user) = born {
            state.users.insert(user.id, user.clone());
        }
        state.order.push(message.id);
        state.messages.insert(message.id, message.clone());
        Ok(())
    }

    fn get_message(&self, id: &MessageId) -> Result<Option<Message>, StoreError> {
        Ok(self.state.read().messages.get(id).cloned())
    }

    fn get_message_at(&self, index: usize) -> Result<Option<Message>, StoreError> {
        let state = self.state.read();
        Ok(state
            .order
            .get(index)
            .and_then(|id| state.messages.get(id))
            .cloned())
    }

    fn message_count(&self) -> Result<usize, StoreError> {
        Ok(self.state.read().order.len())
    }

    fn last_message(&self) -> Result<Option<Message>, StoreError> {
        let state = self.state.read();
        Ok(state
            .order
            .last()
            .and_then(|id| state.messages.get(id))
            .cloned())
    }

    fn put_witness(&self, id: &MessageId) -> Result<(), StoreError> {
        let mut state = self.state.write();
        if !state.witnesses.contains(id) {
            state.witnesses.push(*id);
        }
        Ok(())
    }

    fn witnesses(&self) -> Result<Vec<MessageId>, StoreError> {
        Ok(self.state.read().witnesses.clone())
    }
}
