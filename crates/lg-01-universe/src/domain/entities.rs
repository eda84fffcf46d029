//! # Domain Entities
//!
//! Users, messages and birth certificates.

use super::errors::UniverseError;
use super::identity::{canonical_bytes, content_hash, derive_gender, Gender};
use serde::{Deserialize, Serialize};
use shared_crypto::{PrivateKey, PublicKey, SchemeRegistry, Signature};
use shared_types::{Hash, ZERO_HASH};

/// User identifier (content-derived).
pub type UserId = Hash;

/// Message identifier (content-derived).
pub type MessageId = Hash;

// =============================================================================
// User
// =============================================================================

/// Identity node of the universe. Immutable once admitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// `SHA-256(auth, name, extra, parents)`.
    pub id: UserId,
    /// Public key.
    pub auth: PublicKey,
    /// Free-form birth metadata.
    pub name: String,
    /// Free-form birth metadata.
    pub extra: String,
    /// Empty for roots, otherwise `[female, male]`.
    pub parents: Vec<UserId>,
    /// Message that carried the birth certificate (None for roots).
    pub birth_message: Option<MessageId>,
}

impl User {
    /// Build a parentless (root) user.
    pub fn root(
        auth: PublicKey,
        name: impl Into<String>,
        extra: impl Into<String>,
    ) -> Result<Self, UniverseError> {
        Self::assemble(auth, name.into(), extra.into(), Vec::new(), None)
    }

    /// Build the user a birth certificate describes.
    pub(crate) fn born(
        content: &BirthContent,
        parents: [UserId; 2],
        birth_message: MessageId,
    ) -> Result<Self, UniverseError> {
        Self::assemble(
            content.auth.clone(),
            content.name.clone(),
            content.extra.clone(),
            parents.to_vec(),
            Some(birth_message),
        )
    }

    fn assemble(
        auth: PublicKey,
        name: String,
        extra: String,
        parents: Vec<UserId>,
        birth_message: Option<MessageId>,
    ) -> Result<Self, UniverseError> {
        let mut user = Self {
            id: ZERO_HASH,
            auth,
            name,
            extra,
            parents,
            birth_message,
        };
        user.id = user.compute_id()?;
        Ok(user)
    }

    /// Recompute the content id.
    pub fn compute_id(&self) -> Result<UserId, UniverseError> {
        content_hash(&(&self.auth, &self.name, &self.extra, &self.parents))
    }

    /// Derived gender (recomputed on every call).
    pub fn gender(&self) -> Result<Gender, UniverseError> {
        derive_gender(&self.auth)
    }

    /// True for the genesis pair.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

// =============================================================================
// Birth certificate
// =============================================================================

/// One parent's approval of a birth profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentSignature {
    /// Signing parent.
    pub user_id: UserId,
    /// Signature over [`BirthContent::profile_bytes`].
    pub signature: Signature,
}

/// Payload of a birth message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthContent {
    /// Proposed child name.
    pub name: String,
    /// Proposed child metadata.
    pub extra: String,
    /// Child public key.
    pub auth: PublicKey,
    /// Parent approvals; exactly two are required for admission.
    pub parents: Vec<ParentSignature>,
}

impl BirthContent {
    /// Unsigned birth proposal.
    pub fn new(name: impl Into<String>, extra: impl Into<String>, auth: PublicKey) -> Self {
        Self {
            name: name.into(),
            extra: extra.into(),
            auth,
            parents: Vec::new(),
        }
    }

    /// Bytes each parent signs: the `{name, extra, auth}` profile.
    pub fn profile_bytes(&self) -> Result<Vec<u8>, UniverseError> {
        canonical_bytes(&(&self.name, &self.extra, &self.auth))
    }

    /// Add (or replace) `parent_id`'s approval.
    pub fn sign_by_parent(
        &mut self,
        parent_id: UserId,
        key: &PrivateKey,
        registry: &SchemeRegistry,
    ) -> Result<(), UniverseError> {
        let signature = registry.sign(&self.profile_bytes()?, key)?;
        self.parents.retain(|p| p.user_id != parent_id);
        self.parents.push(ParentSignature {
            user_id: parent_id,
            signature,
        });
        Ok(())
    }
}

// =============================================================================
// Message
// =============================================================================

/// Edge to an already-admitted message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// Author of the referenced message.
    pub sender_id: UserId,
    /// Referenced message.
    pub message_id: MessageId,
}

impl Reference {
    /// Reference pointing at `message`.
    pub fn to(message: &Message) -> Self {
        Self {
            sender_id: message.sender_id,
            message_id: message.id,
        }
    }
}

/// Typed message payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageValue {
    /// Opaque content.
    Text(Vec<u8>),
    /// New identity proposal.
    Birth(BirthContent),
}

impl MessageValue {
    /// Text payload from anything byte-like.
    pub fn text(content: impl Into<Vec<u8>>) -> Self {
        Self::Text(content.into())
    }

    /// Birth content, if this is a birth payload.
    pub fn as_birth(&self) -> Option<&BirthContent> {
        match self {
            Self::Birth(content) => Some(content),
            Self::Text(_) => None,
        }
    }

    /// Payload kind for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Birth(_) => "birth",
        }
    }
}

/// DAG node. Never mutated after admission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// `SHA-256(sender_id, references, value)`; independent of the signature.
    pub id: MessageId,
    /// Author.
    pub sender_id: UserId,
    /// Parent messages, sorted and de-duplicated.
    pub references: Vec<Reference>,
    /// Payload.
    pub value: MessageValue,
    /// Author signature over [`Message::signing_bytes`].
    pub signature: Option<Signature>,
}

impl Message {
    /// Unsigned message with its id computed.
    pub fn unsigned(
        sender_id: UserId,
        mut references: Vec<Reference>,
        value: MessageValue,
    ) -> Result<Self, UniverseError> {
        references.sort_unstable();
        references.dedup();

        let mut message = Self {
            id: ZERO_HASH,
            sender_id,
            references,
            value,
            signature: None,
        };
        message.id = message.compute_id()?;
        Ok(message)
    }

    /// Build and sign a message in one step.
    pub fn create(
        sender_id: UserId,
        references: Vec<Reference>,
        value: MessageValue,
        key: &PrivateKey,
        registry: &SchemeRegistry,
    ) -> Result<Self, UniverseError> {
        let mut message = Self::unsigned(sender_id, references, value)?;
        message.sign(key, registry)?;
        Ok(message)
    }

    /// Recompute the content id.
    pub fn compute_id(&self) -> Result<MessageId, UniverseError> {
        content_hash(&(&self.sender_id, &self.references, &self.value))
    }

    /// Canonical bytes of the message with the signature cleared.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, UniverseError> {
        canonical_bytes(&(
            &self.id,
            &self.sender_id,
            &self.references,
            &self.value,
            Option::<&Signature>::None,
        ))
    }

    /// Replace the signature with one made by `key`.
    pub fn sign(&mut self, key: &PrivateKey, registry: &SchemeRegistry) -> Result<(), UniverseError> {
        let signature = registry.sign(&self.signing_bytes()?, key)?;
        self.signature = Some(signature);
        Ok(())
    }

    /// Check the signature against `auth`. Unsigned messages never verify.
    pub fn verify(&self, auth: &PublicKey, registry: &SchemeRegistry) -> Result<bool, UniverseError> {
        match &self.signature {
            Some(signature) => Ok(registry.verify(&self.signing_bytes()?, signature, auth)?),
            None => Ok(false),
        }
    }
}

// =============================================================================
// Read models
// =============================================================================

/// Public-facing view of a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// User id.
    pub id: UserId,
    /// Viewer the record was produced for.
    pub viewer_id: UserId,
    /// Birth metadata.
    pub name: String,
    /// Birth metadata.
    pub extra: String,
    /// Derived gender.
    pub gender: Gender,
    /// Parent ids (empty for roots).
    pub parents: Vec<UserId>,
    /// Whether this is a genesis user.
    pub is_root: bool,
    /// Highest sequence number among the user's messages.
    pub max_seq: u64,
    /// Sequence standing after the space-time bound is applied.
    pub recognized_seq: u64,
    /// Number of admitted messages authored.
    pub authored_messages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::{ED25519_SOURCE, SINGLE_KEY};

    fn keypair(seed: u8) -> (PrivateKey, PublicKey) {
        SchemeRegistry::default()
            .from_seeds(ED25519_SOURCE, SINGLE_KEY, &[[seed; 32]])
            .unwrap()
    }

    #[test]
    fn test_root_user_id_is_content_derived() {
        let (_, public) = keypair(1);
        let a = User::root(public.clone(), "eve", "").unwrap();
        let b = User::root(public, "eve", "").unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.compute_id().unwrap(), a.id);
        assert!(a.is_root());
    }

    #[test]
    fn test_message_id_ignores_signature() {
        let registry = SchemeRegistry::default();
        let (key, _) = keypair(2);
        let signed = Message::create([7; 32], vec![], MessageValue::text("hi"), &key, &registry).unwrap();
        let unsigned = Message::unsigned([7; 32], vec![], MessageValue::text("hi")).unwrap();
        assert_eq!(signed.id, unsigned.id);
        assert!(signed.signature.is_some());
    }

    #[test]
    fn test_references_are_canonicalized() {
        let r1 = Reference { sender_id: [1; 32], message_id: [2; 32] };
        let r2 = Reference { sender_id: [3; 32], message_id: [4; 32] };
        let a = Message::unsigned([9; 32], vec![r2, r1, r2], MessageValue::text("x")).unwrap();
        let b = Message::unsigned([9; 32], vec![r1, r2], MessageValue::text("x")).unwrap();
        assert_eq!(a.references, vec![r1, r2]);
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn test_verify_detects_tampering() {
        let registry = SchemeRegistry::default();
        let (key, public) = keypair(3);
        let mut message = Message::create([5; 32], vec![], MessageValue::text("ok"), &key, &registry).unwrap();
        assert!(message.verify(&public, &registry).unwrap());

        message.value = MessageValue::text("forged");
        assert!(!message.verify(&public, &registry).unwrap());
    }

    #[test]
    fn test_unsigned_never_verifies() {
        let registry = SchemeRegistry::default();
        let (_, public) = keypair(4);
        let message = Message::unsigned([5; 32], vec![], MessageValue::text("ok")).unwrap();
        assert!(!message.verify(&public, &registry).unwrap());
    }

    #[test]
    fn test_sign_by_parent_replaces_existing_approval() {
        let registry = SchemeRegistry::default();
        let (parent_key, _) = keypair(5);
        let (_, child_auth) = keypair(6);
        let mut content = BirthContent::new("kid", "", child_auth);
        content.sign_by_parent([1; 32], &parent_key, &registry).unwrap();
        content.sign_by_parent([1; 32], &parent_key, &registry).unwrap();
        assert_eq!(content.parents.len(), 1);
    }

    #[test]
    fn test_message_roundtrip_preserves_id() {
        let registry = SchemeRegistry::default();
        let (key, _) = keypair(7);
        let message = Message::create([5; 32], vec![], MessageValue::text("wire"), &key, &registry).unwrap();
        let bytes = bincode::serialize(&message).unwrap();
        let decoded: Message = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded.compute_id().unwrap(), message.id);
    }

    mod proptest_ids {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Message ids depend only on sender, references and value.
            #[test]
            fn prop_message_id_deterministic(
                sender in any::<[u8; 32]>(),
                target in any::<[u8; 32]>(),
                body in proptest::collection::vec(any::<u8>(), 0..128),
            ) {
                let refs = vec![Reference { sender_id: sender, message_id: target }];
                let a = Message::unsigned(sender, refs.clone(), MessageValue::Text(body.clone())).unwrap();
                let b = Message::unsigned(sender, refs, MessageValue::Text(body)).unwrap();
                prop_assert_eq!(a.id, b.id);

                let decoded: Message = bincode::deserialize(&bincode::serialize(&a).unwrap()).unwrap();
                prop_assert_eq!(decoded.compute_id().unwrap(), a.id);
            }
        }
    }
}
