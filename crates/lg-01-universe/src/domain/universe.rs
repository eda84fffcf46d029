//! # Universe Aggregate
//!
//! The DAG of users and messages plus derived sequence state. Admission is
//! split into `prepare` (all checks, no mutation) and `commit` (infallible
//! mutation) so a storage mirror can be written in between.

use super::entities::{Message, MessageId, MessageValue, User, UserId, UserInfo};
use super::errors::UniverseError;
use super::invariants::{invariant_birth_parents, invariant_root_pair, REQUIRED_PARENTS};
use super::sequence::{SequenceBook, SequenceState};
use crate::config::UniverseConfig;
use shared_crypto::SchemeRegistry;
use std::collections::HashMap;
use std::sync::Arc;

/// Result of a successful admission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Admission {
    /// Admitted message.
    pub message_id: MessageId,
    /// Its author.
    pub sender_id: UserId,
    /// Seq assigned within the author's chain.
    pub seq: u64,
    /// User created by a birth payload.
    pub new_user: Option<UserId>,
}

/// Checked, not yet applied admission.
#[derive(Debug)]
pub struct PreparedAdmission {
    new_user: Option<User>,
}

impl PreparedAdmission {
    /// User the admission will create, if any.
    pub fn new_user(&self) -> Option<&User> {
        self.new_user.as_ref()
    }
}

/// Users, messages and sequence bookkeeping.
pub struct Universe {
    registry: Arc<SchemeRegistry>,
    roots: [User; 2],
    users: HashMap<UserId, User>,
    messages: HashMap<MessageId, Message>,
    order: Vec<MessageId>,
    positions: HashMap<MessageId, usize>,
    sequences: SequenceBook,
}

impl Universe {
    /// Seed a universe with its genesis pair.
    pub fn new(
        user_a: User,
        user_b: User,
        registry: Arc<SchemeRegistry>,
        config: &UniverseConfig,
    ) -> Result<Self, UniverseError> {
        invariant_root_pair(&user_a, &user_b, &registry)?;

        let users = HashMap::from([
            (user_a.id, user_a.clone()),
            (user_b.id, user_b.clone()),
        ]);
        let roots = [user_a, user_b];
        Ok(Self {
            registry,
            roots,
            users,
            messages: HashMap::new(),
            order: Vec::new(),
            positions: HashMap::new(),
            sequences: SequenceBook::new(config.reproduction_interval),
        })
    }

    /// Validate and admit `message`.
    pub fn add_message(&mut self, message: Message) -> Result<Admission, UniverseError> {
        let prepared = self.prepare(&message)?;
        Ok(self.commit(message, prepared))
    }

    /// Run every admission check without mutating anything.
    ///
    /// Order: sender, id integrity, duplicate, references, signature, birth.
    pub fn prepare(&self, message: &Message) -> Result<PreparedAdmission, UniverseError> {
        let sender = self
            .users
            .get(&message.sender_id)
            .ok_or(UniverseError::SenderUnknown(message.sender_id))?;

        let computed = message.compute_id()?;
        if computed != message.id {
            return Err(UniverseError::InvalidMessageId {
                claimed: message.id,
                computed,
            });
        }

        if self.messages.contains_key(&message.id) {
            return Err(UniverseError::DuplicateMessage(message.id));
        }

        for reference in &message.references {
            match self.messages.get(&reference.message_id) {
                Some(target) if target.sender_id == reference.sender_id => {}
                _ => return Err(UniverseError::UnknownReference(reference.message_id)),
            }
        }

        let signature = message
            .signature
            .as_ref()
            .ok_or_else(|| UniverseError::BadSignature("message is unsigned".into()))?;
        let valid = self
            .registry
            .verify(&message.signing_bytes()?, signature, &sender.auth)
            .map_err(|e| UniverseError::BadSignature(e.to_string()))?;
        if !valid {
            return Err(UniverseError::BadSignature(
                "signature does not verify against sender key".into(),
            ));
        }

        let new_user = match &message.value {
            MessageValue::Birth(_) => Some(self.prepare_birth(message)?),
            MessageValue::Text(_) => None,
        };

        Ok(PreparedAdmission { new_user })
    }

    fn prepare_birth(&self, message: &Message) -> Result<User, UniverseError> {
        let Some(content) = message.value.as_birth() else {
            return Err(UniverseError::InvalidBirthContent("not a birth payload".into()));
        };

        if content.parents.len() != REQUIRED_PARENTS {
            return Err(UniverseError::InvalidBirthContent(format!(
                "expected {REQUIRED_PARENTS} parent signatures, got {}",
                content.parents.len()
            )));
        }
        if !self
            .registry
            .supports(&content.auth.source, &content.auth.sig_type)
        {
            return Err(UniverseError::InvalidBirthContent(format!(
                "unsupported child key scheme {}",
                content.auth.scheme_label()
            )));
        }

        let lookup = |index: usize| {
            let id = content.parents[index].user_id;
            self.users.get(&id).ok_or_else(|| {
                UniverseError::InvalidBirthContent(format!(
                    "parent {} is unknown",
                    shared_types::short_hex(&id)
                ))
            })
        };
        let parents = [lookup(0)?, lookup(1)?];
        let [female, male] = invariant_birth_parents(content, parents, &self.registry)?;

        let child = User::born(content, [female.id, male.id], message.id)?;
        if self.users.contains_key(&child.id) {
            return Err(UniverseError::InvalidBirthContent(format!(
                "user {} already exists",
                shared_types::short_hex(&child.id)
            )));
        }
        Ok(child)
    }

    /// Apply a prepared admission. Must follow a successful [`Self::prepare`]
    /// of the same message with no mutation in between.
    pub fn commit(&mut self, message: Message, prepared: PreparedAdmission) -> Admission {
        let id = message.id;
        let sender_id = message.sender_id;
        let seq = self.sequences.record(id, sender_id, &message.references);

        let new_user = prepared.new_user.map(|user| {
            let user_id = user.id;
            self.users.insert(user_id, user);
            user_id
        });

        self.positions.insert(id, self.order.len());
        self.order.push(id);
        self.messages.insert(id, message);

        Admission {
            message_id: id,
            sender_id,
            seq,
            new_user,
        }
    }

    /// Mark `message_id` as a space-time anchor; returns messages credited.
    pub fn add_space_time_witness(&mut self, message_id: &MessageId) -> Result<usize, UniverseError> {
        self.sequences
            .witness(message_id)
            .ok_or(UniverseError::MessageUnknown(*message_id))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Genesis pair in construction order.
    pub fn roots(&self) -> &[User; 2] {
        &self.roots
    }

    /// Whether the genesis pair is exactly `{a, b}` (any order).
    pub fn has_roots(&self, a: &UserId, b: &UserId) -> bool {
        let [first, second] = &self.roots;
        (first.id == *a && second.id == *b) || (first.id == *b && second.id == *a)
    }

    /// Lookup a user.
    pub fn get_user_by_id(&self, id: &UserId) -> Option<&User> {
        self.users.get(id)
    }

    /// Lookup a message.
    pub fn get_message_by_id(&self, id: &MessageId) -> Option<&Message> {
        self.messages.get(id)
    }

    /// Public record of `target_id` as seen by `viewer_id`; both must exist.
    pub fn get_user_info(&self, target_id: &UserId, viewer_id: &UserId) -> Option<UserInfo> {
        let target = self.users.get(target_id)?;
        self.users.get(viewer_id)?;
        let gender = target.gender().ok()?;
        let state = self.sequences.state(target_id);

        Some(UserInfo {
            id: target.id,
            viewer_id: *viewer_id,
            name: target.name.clone(),
            extra: target.extra.clone(),
            gender,
            parents: target.parents.clone(),
            is_root: target.is_root(),
            max_seq: state.max_seq,
            recognized_seq: state.recognized_seq,
            authored_messages: state.authored,
        })
    }

    /// Highest seq of `user_id`'s messages; 0 if none.
    pub fn get_max_seq(&self, user_id: &UserId) -> u64 {
        self.sequences.state(user_id).max_seq
    }

    /// Recognized (space-time bounded) seq of `user_id`.
    pub fn get_recognized_seq(&self, user_id: &UserId) -> u64 {
        self.sequences.state(user_id).recognized_seq
    }

    /// Full sequence standing of `user_id`.
    pub fn sequence_state(&self, user_id: &UserId) -> SequenceState {
        self.sequences.state(user_id)
    }

    /// Seq assigned to an admitted message.
    pub fn seq_of(&self, message_id: &MessageId) -> Option<u64> {
        self.sequences.seq_of(message_id)
    }

    /// Whether the message is a space-time anchor.
    pub fn is_witness(&self, message_id: &MessageId) -> bool {
        self.sequences.is_anchor(message_id)
    }

    /// Number of known users.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Number of admitted messages.
    pub fn message_count(&self) -> usize {
        self.order.len()
    }

    /// Ids of every known user.
    pub fn user_ids(&self) -> impl Iterator<Item = &UserId> {
        self.users.keys()
    }

    /// Most recently admitted message.
    pub fn last_message_id(&self) -> Option<MessageId> {
        self.order.last().copied()
    }

    /// Insertion position of a message.
    pub fn position_of(&self, message_id: &MessageId) -> Option<usize> {
        self.positions.get(message_id).copied()
    }

    /// Up to `limit` messages admitted after `last_known`.
    ///
    /// `None` or an id this universe does not know means start-of-history.
    pub fn messages_after(&self, last_known: Option<&MessageId>, limit: usize) -> Vec<Message> {
        let start = last_known
            .and_then(|id| self.positions.get(id))
            .map_or(0, |position| position + 1);

        self.order
            .iter()
            .skip(start)
            .take(limit)
            .filter_map(|id| self.messages.get(id))
            .cloned()
            .collect()
    }
}
