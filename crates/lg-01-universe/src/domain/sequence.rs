//! # Sequence and Space-Time Bookkeeping
//!
//! Each admitted message gets a sequence number within its author's chain:
//!
//! - references none of the author's own messages: 1
//! - otherwise: highest own referenced seq + 1
//!
//! A seq depends only on the message's ancestry, never on admission order,
//! so two nodes holding the same messages agree on every seq.
//!
//! A message carries *credit* once it is a witness anchor or reaches one;
//! credit is the highest anchor seq reachable from it. Per author:
//!
//! ```text
//! witnessed  = highest seq of the author's credited messages
//! borrowed   = highest credit among the author's messages
//! recognized = max(previous, min(max_seq, witnessed + interval), borrowed)
//! ```
//!
//! Every field only grows.

use super::entities::{MessageId, Reference, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// Per-user sequence standing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceState {
    /// Highest seq among the user's messages.
    pub max_seq: u64,
    /// Sequence standing after the space-time bound.
    pub recognized_seq: u64,
    /// Highest seq of the user's messages that are anchors or reach one.
    pub witnessed_seq: u64,
    /// Highest anchor seq reachable from the user's messages.
    pub borrowed_seq: u64,
    /// Number of admitted messages authored.
    pub authored: u64,
}

#[derive(Clone, Copy, Debug)]
struct MessageMark {
    author: UserId,
    seq: u64,
    credit: Option<u64>,
}

/// Sequence and witness index over admitted messages.
#[derive(Clone, Debug)]
pub struct SequenceBook {
    interval: u64,
    marks: HashMap<MessageId, MessageMark>,
    children: HashMap<MessageId, Vec<MessageId>>,
    anchors: HashSet<MessageId>,
    users: HashMap<UserId, SequenceState>,
}

impl SequenceBook {
    /// Empty book with the given reproduction interval.
    pub fn new(interval: u64) -> Self {
        Self {
            interval,
            marks: HashMap::new(),
            children: HashMap::new(),
            anchors: HashSet::new(),
            users: HashMap::new(),
        }
    }

    /// Standing of `user` (all zero if it authored nothing).
    pub fn state(&self, user: &UserId) -> SequenceState {
        self.users.get(user).copied().unwrap_or_default()
    }

    /// Seq assigned to an admitted message.
    pub fn seq_of(&self, message: &MessageId) -> Option<u64> {
        self.marks.get(message).map(|m| m.seq)
    }

    /// Whether `message` was declared a witness anchor.
    pub fn is_anchor(&self, message: &MessageId) -> bool {
        self.anchors.contains(message)
    }

    /// Seq a new message by `author` with `references` would receive.
    pub fn next_seq(&self, author: &UserId, references: &[Reference]) -> u64 {
        references
            .iter()
            .filter(|r| r.sender_id == *author)
            .filter_map(|r| self.marks.get(&r.message_id))
            .map(|m| m.seq + 1)
            .max()
            .unwrap_or(1)
    }

    /// Record an admitted message; returns its seq.
    pub fn record(&mut self, id: MessageId, author: UserId, references: &[Reference]) -> u64 {
        let seq = self.next_seq(&author, references);
        let credit = references
            .iter()
            .filter_map(|r| self.marks.get(&r.message_id))
            .filter_map(|m| m.credit)
            .max();

        for reference in references {
            self.children.entry(reference.message_id).or_default().push(id);
        }
        self.marks.insert(id, MessageMark { author, seq, credit });

        let state = self.users.entry(author).or_default();
        state.authored += 1;
        state.max_seq = state.max_seq.max(seq);
        if let Some(credit) = credit {
            state.witnessed_seq = state.witnessed_seq.max(seq);
            state.borrowed_seq = state.borrowed_seq.max(credit);
        }
        self.refresh(&author);
        seq
    }

    /// Declare `message` an anchor and push its credit to every descendant.
    ///
    /// Returns the number of messages whose credit rose, or `None` if the
    /// message is unknown. Re-declaring an anchor is a no-op.
    pub fn witness(&mut self, message: &MessageId) -> Option<usize> {
        let anchor_seq = self.marks.get(message)?.seq;
        if !self.anchors.insert(*message) {
            return Some(0);
        }

        let mut queue = VecDeque::from([*message]);
        let mut touched = HashSet::new();
        let mut credited = 0;

        while let Some(current) = queue.pop_front() {
            let Some(mark) = self.marks.get_mut(&current) else {
                continue;
            };
            // Descendants of a node already holding this credit hold it too.
            if mark.credit.is_some_and(|c| c >= anchor_seq) {
                continue;
            }
            mark.credit = Some(anchor_seq);
            let (author, seq) = (mark.author, mark.seq);

            let state = self.users.entry(author).or_default();
            state.witnessed_seq = state.witnessed_seq.max(seq);
            state.borrowed_seq = state.borrowed_seq.max(anchor_seq);
            touched.insert(author);
            credited += 1;

            if let Some(children) = self.children.get(&current) {
                queue.extend(children.iter().copied());
            }
        }

        for author in touched {
            self.refresh(&author);
        }
        Some(credited)
    }

    fn refresh(&mut self, user: &UserId) {
        let interval = self.interval;
        if let Some(state) = self.users.get_mut(user) {
            let bound = state.max_seq.min(state.witnessed_seq.saturating_add(interval));
            state.recognized_seq = state.recognized_seq.max(bound).max(state.borrowed_seq);
        }
    }
}
