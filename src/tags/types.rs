//! Tag editing data structures
//!
//! - `RowTagState`: committed tags, pending mutations and inline input of a row
//! - `PendingTag`: one optimistic change, confirmed or still in flight
//! - `TagMutation`: an optimistic change waiting for the backend
//! - `TagRequest`: JSON body of the backend's tag endpoints

use serde::{Deserialize, Serialize};

/// Kind of tag mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOp {
    Add,
    Remove,
}

impl TagOp {
    /// Apply the operation to a tag list
    ///
    /// `Remove` drops the first occurrence only.
    pub fn apply(self, tags: &mut Vec<String>, value: &str) {
        match self {
            Self::Add => tags.push(value.to_string()),
            Self::Remove => {
                if let Some(pos) = tags.iter().position(|t| t == value) {
                    tags.remove(pos);
                }
            }
        }
    }
}

/// An optimistic mutation not yet folded into the committed tags
///
/// A confirmed mutation stays pending until every mutation issued before it
/// has been settled, so committed tags always follow issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTag {
    pub id: u64,
    pub op: TagOp,
    pub value: String,
    /// The backend accepted it
    pub confirmed: bool,
}

/// Handle returned by an optimistic mutation, settled once the backend answers
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a tag mutation must be settled to commit or roll it back"]
pub struct TagMutation {
    pub(crate) id: u64,
    pub row_id: String,
    pub op: TagOp,
    pub value: String,
}

/// Tag state of one row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowTagState {
    pub row_id: String,
    /// Tags confirmed by the backend, in order
    pub committed: Vec<String>,
    /// Optimistic mutations, in issue order
    pub pending: Vec<PendingTag>,
    /// Open inline input, if any
    pub input: Option<String>,
    seeded: bool,
    /// Changes committed before the row's own tags were known
    early: Vec<(TagOp, String)>,
}

impl RowTagState {
    /// State of a row whose tags as stored by the backend are `committed`
    #[must_use]
    pub fn new(row_id: impl Into<String>, committed: Vec<String>) -> Self {
        Self {
            row_id: row_id.into(),
            committed,
            seeded: true,
            ..Self::default()
        }
    }

    /// State of a row edited before it was fetched
    #[must_use]
    pub fn unseeded(row_id: impl Into<String>) -> Self {
        Self {
            row_id: row_id.into(),
            ..Self::default()
        }
    }

    /// Whether the row's own tags are known
    #[must_use]
    pub const fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Take the row's tags as fetched, replaying changes committed before
    ///
    /// No-op once seeded. A replayed add already present in `tags` is not
    /// duplicated.
    pub fn seed(&mut self, tags: Vec<String>) {
        if self.seeded {
            return;
        }
        let mut committed = tags;
        for (op, value) in self.early.drain(..) {
            if op == TagOp::Add && committed.contains(&value) {
                continue;
            }
            op.apply(&mut committed, &value);
        }
        self.committed = committed;
        self.seeded = true;
    }

    /// Move the confirmed mutations at the head of `pending` into `committed`
    pub(crate) fn fold_confirmed(&mut self) {
        let ready = self.pending.iter().take_while(|p| p.confirmed).count();
        for pending in self.pending.drain(..ready) {
            pending.op.apply(&mut self.committed, &pending.value);
            if !self.seeded {
                self.early.push((pending.op, pending.value));
            }
        }
    }

    /// Tags as displayed: committed tags with pending mutations applied
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        let mut tags = self.committed.clone();
        for pending in &self.pending {
            pending.op.apply(&mut tags, &pending.value);
        }
        tags
    }

    /// Whether any mutation still awaits the backend
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Body of the backend's add/remove tag endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagRequest {
    /// Collection the row lives in
    pub tp: String,
    pub id: String,
    pub tag: String,
}

impl TagRequest {
    #[must_use]
    pub fn new(collection: &str, row_id: &str, tag: &str) -> Self {
        Self {
            tp: collection.to_string(),
            id: row_id.to_string(),
            tag: tag.to_string(),
        }
    }
}
