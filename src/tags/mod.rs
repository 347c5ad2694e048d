//! Inline tag editing
//!
//! `TagEditor` keeps the tags of every row a grid has shown. Mutations are
//! optimistic and two-phase:
//!
//! 1. `add_tag` / `remove_tag` record a pending change; the row displays it at once
//! 2. the caller sends the change to a [`TagEndpoint`]
//! 3. `settle` commits the change on success or drops it on failure
//!
//! Accepted changes reach the committed tags in the order they were issued,
//! whatever order the backend answers in. A row edited before it is tracked
//! keeps those changes and replays them over its tags once `track` sees it.
//!
//! ```
//! use assetgrid::tags::TagEditor;
//!
//! let mut editor = TagEditor::new("asset");
//! let mutation = editor.add_tag("65f0", "prod").unwrap();
//! assert_eq!(editor.tags("65f0"), vec!["prod"]);
//!
//! // the backend refused it
//! let _ = editor.settle(mutation, Err(assetgrid::tags::TagMutationError::Rejected("denied".into())));
//! assert!(editor.tags("65f0").is_empty());
//! ```

pub mod endpoint;
pub mod error;
pub mod types;

pub use endpoint::TagEndpoint;
pub use error::TagMutationError;
pub use types::{PendingTag, RowTagState, TagMutation, TagOp, TagRequest};

use crate::Row;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Tag state of the rows of one grid view
#[derive(Debug, Clone)]
pub struct TagEditor {
    collection: String,
    rows: HashMap<String, RowTagState>,
    next_id: u64,
}

impl TagEditor {
    /// Create an editor for rows of the backend collection `collection`
    #[must_use]
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            rows: HashMap::new(),
            next_id: 0,
        }
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Start tracking a row, seeding it from the row's own tags
    ///
    /// Changes made to the row before it was tracked are replayed over its
    /// tags. An already seeded row is left untouched.
    pub fn track(&mut self, row: &Row) -> &RowTagState {
        let state = self
            .rows
            .entry(row.id.clone())
            .or_insert_with(|| RowTagState::unseeded(row.id.clone()));
        state.seed(row.tags());
        state
    }

    /// Stop tracking a row
    pub fn forget(&mut self, row_id: &str) -> Option<RowTagState> {
        self.rows.remove(row_id)
    }

    #[must_use]
    pub fn state(&self, row_id: &str) -> Option<&RowTagState> {
        self.rows.get(row_id)
    }

    /// Displayed tags of a row, empty if the row is not tracked
    #[must_use]
    pub fn tags(&self, row_id: &str) -> Vec<String> {
        self.rows.get(row_id).map(RowTagState::tags).unwrap_or_default()
    }

    fn row_mut(&mut self, row_id: &str) -> &mut RowTagState {
        self.rows
            .entry(row_id.to_string())
            .or_insert_with(|| RowTagState::unseeded(row_id))
    }

    fn push_pending(&mut self, row_id: &str, op: TagOp, value: String) -> TagMutation {
        self.next_id += 1;
        let id = self.next_id;
        self.row_mut(row_id).pending.push(PendingTag {
            id,
            op,
            value: value.clone(),
            confirmed: false,
        });
        debug!(row = row_id, ?op, tag = %value, "optimistic tag change");
        TagMutation {
            id,
            row_id: row_id.to_string(),
            op,
            value,
        }
    }

    /// Optimistically append a tag
    ///
    /// # Errors
    ///
    /// Returns `TagMutationError::EmptyTag` for a blank value.
    pub fn add_tag(&mut self, row_id: &str, value: &str) -> Result<TagMutation, TagMutationError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(TagMutationError::EmptyTag);
        }
        Ok(self.push_pending(row_id, TagOp::Add, value.to_string()))
    }

    /// Optimistically remove the first occurrence of a tag
    ///
    /// # Errors
    ///
    /// Returns `TagMutationError::UnknownRow` if the row's tags are not known
    /// yet and it does not display the tag, `TagMutationError::NotPresent` if a
    /// tracked row does not display it.
    pub fn remove_tag(&mut self, row_id: &str, value: &str) -> Result<TagMutation, TagMutationError> {
        if !self.tags(row_id).iter().any(|t| t == value) {
            if !self.rows.get(row_id).is_some_and(RowTagState::is_seeded) {
                return Err(TagMutationError::UnknownRow(row_id.to_string()));
            }
            return Err(TagMutationError::NotPresent {
                row_id: row_id.to_string(),
                tag: value.to_string(),
            });
        }
        Ok(self.push_pending(row_id, TagOp::Remove, value.to_string()))
    }

    /// Commit or roll back a mutation once the backend answered
    ///
    /// An accepted mutation is committed once every mutation issued before it
    /// on the same row has settled. A mutation for a row that was forgotten
    /// meanwhile is ignored.
    ///
    /// # Errors
    ///
    /// Returns the backend's error after rolling the mutation back.
    pub fn settle(
        &mut self,
        mutation: TagMutation,
        result: Result<(), TagMutationError>,
    ) -> Result<(), TagMutationError> {
        let Some(state) = self.rows.get_mut(&mutation.row_id) else {
            debug!(row = %mutation.row_id, "settling mutation of untracked row");
            return result;
        };
        let Some(pos) = state.pending.iter().position(|p| p.id == mutation.id) else {
            return result;
        };

        match result {
            Ok(()) => {
                state.pending[pos].confirmed = true;
                state.fold_confirmed();
                Ok(())
            }
            Err(err) => {
                let pending = state.pending.remove(pos);
                state.fold_confirmed();
                warn!(
                    row = %mutation.row_id,
                    op = ?pending.op,
                    tag = %pending.value,
                    error = %err,
                    "tag change rejected, rolling back"
                );
                Err(err)
            }
        }
    }

    /// Add a tag and persist it through `endpoint`
    ///
    /// # Errors
    ///
    /// Returns `TagMutationError` if the value is blank or the endpoint fails;
    /// in the latter case the tag has been rolled back.
    pub async fn add_tag_with<E: TagEndpoint + ?Sized>(
        &mut self,
        endpoint: &E,
        row_id: &str,
        value: &str,
    ) -> Result<(), TagMutationError> {
        let mutation = self.add_tag(row_id, value)?;
        let result = endpoint
            .add_tag(&mutation.row_id, &self.collection, &mutation.value)
            .await;
        self.settle(mutation, result)
    }

    /// Remove a tag and persist the removal through `endpoint`
    ///
    /// # Errors
    ///
    /// Returns `TagMutationError` if the tag is not shown or the endpoint fails;
    /// in the latter case the tag is restored.
    pub async fn remove_tag_with<E: TagEndpoint + ?Sized>(
        &mut self,
        endpoint: &E,
        row_id: &str,
        value: &str,
    ) -> Result<(), TagMutationError> {
        let mutation = self.remove_tag(row_id, value)?;
        let result = endpoint
            .remove_tag(&mutation.row_id, &self.collection, &mutation.value)
            .await;
        self.settle(mutation, result)
    }

    /// Open the inline input of a row (no-op if already open)
    pub fn open_input(&mut self, row_id: &str) {
        let state = self.row_mut(row_id);
        if state.input.is_none() {
            state.input = Some(String::new());
        }
    }

    /// Replace the text of a row's inline input, opening it if needed
    pub fn set_input(&mut self, row_id: &str, text: impl Into<String>) {
        self.row_mut(row_id).input = Some(text.into());
    }

    /// Current text of a row's inline input
    #[must_use]
    pub fn input(&self, row_id: &str) -> Option<&str> {
        self.rows.get(row_id).and_then(|s| s.input.as_deref())
    }

    /// Close a row's inline input without adding anything
    pub fn cancel_input(&mut self, row_id: &str) {
        if let Some(state) = self.rows.get_mut(row_id) {
            state.input = None;
        }
    }

    /// Commit a row's inline input (Enter or blur)
    ///
    /// The input is closed. Blank text is a no-op and yields `None`.
    ///
    /// # Errors
    ///
    /// Never fails for blank input; otherwise propagates `add_tag` errors.
    pub fn commit_input(&mut self, row_id: &str) -> Result<Option<TagMutation>, TagMutationError> {
        let Some(text) = self.rows.get_mut(row_id).and_then(|s| s.input.take()) else {
            return Ok(None);
        };
        if text.trim().is_empty() {
            return Ok(None);
        }
        self.add_tag(row_id, &text).map(Some)
    }
}
