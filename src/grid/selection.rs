//! Row selection and bulk deletion
//!
//! With multiple selection switched on, a grid keeps the ids of the checked
//! rows of its loaded page. The selected rows are deleted with one
//! [`DeleteRequest`] sent to a [`DeleteEndpoint`].

use super::error::FetchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body of the backend's bulk delete endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteRequest {
    pub ids: Vec<String>,
    /// Collection the rows live in
    pub index: String,
    /// Also drop the assets the rows were found on
    #[serde(rename = "delA")]
    pub delete_assets: bool,
}

impl DeleteRequest {
    #[must_use]
    pub fn new(collection: &str, ids: Vec<String>, delete_assets: bool) -> Self {
        Self {
            ids,
            index: collection.to_string(),
            delete_assets,
        }
    }
}

/// Backend deleting rows in bulk
#[async_trait]
pub trait DeleteEndpoint {
    /// Delete the rows named by `request`
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the backend rejects the request or cannot be reached.
    async fn delete(&self, request: &DeleteRequest) -> Result<(), FetchError>;
}

/// Selected row ids, in selection order
///
/// Nothing can be selected while multiple selection is off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSelection {
    enabled: bool,
    ids: Vec<String>,
}

impl RowSelection {
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Switch multiple selection on or off; switching off clears it
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.ids.clear();
        }
    }

    /// Add a row, returning whether it was newly selected
    pub fn select(&mut self, row_id: &str) -> bool {
        if !self.enabled || self.contains(row_id) {
            return false;
        }
        self.ids.push(row_id.to_string());
        true
    }

    /// Remove a row, returning whether it was selected
    pub fn deselect(&mut self, row_id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| id != row_id);
        self.ids.len() != before
    }

    #[must_use]
    pub fn contains(&self, row_id: &str) -> bool {
        self.ids.iter().any(|id| id == row_id)
    }

    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Keep only the rows for which `keep` holds
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.ids.retain(|id| keep(id));
    }
}
