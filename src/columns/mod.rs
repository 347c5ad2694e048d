//! Column registry
//!
//! `ColumnRegistry` owns the columns of one grid view and keeps their
//! visibility in a [`ConfigStore`] under the view's identifier. The stored
//! layout is read once on construction and rewritten after every change.
//!
//! ```
//! use assetgrid::columns::{ColumnRegistry, ColumnSpec, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let columns = vec![ColumnSpec::new("host", "Host"), ColumnSpec::new("title", "Title")];
//!
//! let mut registry = ColumnRegistry::new("asset", columns.clone(), store.clone()).unwrap();
//! registry.set_hidden("title", true).unwrap();
//!
//! let restored = ColumnRegistry::new("asset", columns, store).unwrap();
//! assert_eq!(restored.visible_fields(), vec!["host"]);
//! ```

pub mod error;
pub mod store;
pub mod types;
pub mod views;

pub use error::StorageError;
pub use store::{ConfigStore, MemoryStore, SledStore};
pub use types::{ColumnSpec, FilterOption, PersistedColumnConfig, SELECT_FIELD};
pub use views::{BUILTIN_VIEWS, ViewDefinition};

use tracing::{debug, warn};

/// Columns of one view with persisted visibility
#[derive(Debug)]
pub struct ColumnRegistry<S: ConfigStore> {
    view_id: String,
    columns: Vec<ColumnSpec>,
    statistics_hidden: bool,
    store: S,
}

impl<S: ConfigStore> ColumnRegistry<S> {
    /// Create a registry and restore the view's stored layout
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub fn new(
        view_id: impl Into<String>,
        columns: Vec<ColumnSpec>,
        store: S,
    ) -> Result<Self, StorageError> {
        let mut registry = Self {
            view_id: view_id.into(),
            columns,
            statistics_hidden: false,
            store,
        };
        registry.restore()?;
        Ok(registry)
    }

    /// Create a registry for a view definition
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub fn for_view(view: &ViewDefinition, store: S) -> Result<Self, StorageError> {
        Self::new(view.id.clone(), view.columns.clone(), store)
    }

    #[must_use]
    pub fn view_id(&self) -> &str {
        &self.view_id
    }

    /// All columns in declaration order
    #[must_use]
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, field: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// Columns currently shown, selection column included
    pub fn visible_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| !c.hidden)
    }

    /// Row fields currently rendered, selection column excluded
    #[must_use]
    pub fn visible_fields(&self) -> Vec<&str> {
        self.visible_columns()
            .filter(|c| !c.is_select())
            .map(|c| c.field.as_str())
            .collect()
    }

    #[must_use]
    pub const fn statistics_hidden(&self) -> bool {
        self.statistics_hidden
    }

    /// Show or hide a column, then persist the layout
    ///
    /// Returns `false` and leaves the store untouched when no column has
    /// that field.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the layout cannot be written.
    pub fn set_hidden(&mut self, field: &str, hidden: bool) -> Result<bool, StorageError> {
        let Some(column) = self.columns.iter_mut().find(|c| c.field == field) else {
            debug!(view = %self.view_id, field, "no such column");
            return Ok(false);
        };
        column.hidden = hidden;
        self.persist()?;
        Ok(true)
    }

    /// Show or hide the statistics panel, then persist the layout
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the layout cannot be written.
    pub fn set_statistics_hidden(&mut self, hidden: bool) -> Result<(), StorageError> {
        self.statistics_hidden = hidden;
        self.persist()
    }

    /// Current layout as stored
    #[must_use]
    pub fn snapshot(&self) -> PersistedColumnConfig {
        PersistedColumnConfig {
            statistics_hidden: self.statistics_hidden,
            fields: self
                .columns
                .iter()
                .filter(|c| !c.is_select())
                .map(|c| (c.field.clone(), c.hidden))
                .collect(),
        }
    }

    /// Write the layout under the view identifier
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or writing fails.
    pub fn persist(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.snapshot())?;
        self.store.set(&self.view_id, &json)
    }

    /// Apply the stored layout to the columns
    ///
    /// Fields absent from the stored layout keep their declared visibility.
    /// The selection column is never restored. An unreadable layout is logged
    /// and ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub fn restore(&mut self) -> Result<(), StorageError> {
        let Some(raw) = self.store.get(&self.view_id)? else {
            return Ok(());
        };

        let stored: PersistedColumnConfig = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(view = %self.view_id, error = %e, "ignoring unreadable column layout");
                return Ok(());
            }
        };

        for column in self.columns.iter_mut().filter(|c| !c.is_select()) {
            if let Some(&hidden) = stored.fields.get(&column.field) {
                column.hidden = hidden;
            }
        }
        self.statistics_hidden = stored.statistics_hidden;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestStore, sample_columns};

    fn registry(store: &MemoryStore) -> ColumnRegistry<MemoryStore> {
        ColumnRegistry::new("asset", sample_columns(), store.clone()).unwrap()
    }

    #[test]
    fn test_defaults_without_stored_layout() {
        let store = MemoryStore::new();
        let registry = registry(&store);
        assert!(registry.columns().iter().all(|c| !c.hidden));
        assert!(!registry.statistics_hidden());
        assert_eq!(store.get("asset").unwrap(), None);
    }

    #[test]
    fn test_hidden_roundtrip() {
        let store = MemoryStore::new();
        let mut first = registry(&store);
        assert!(first.set_hidden("title", true).unwrap());

        let fresh = registry(&store);
        assert!(fresh.column("title").unwrap().hidden);
        assert!(!fresh.column("host").unwrap().hidden);
    }

    #[test]
    fn test_set_hidden_persists_immediately() {
        let store = MemoryStore::new();
        let mut registry = registry(&store);
        registry.set_hidden("host", true).unwrap();

        let raw = store.get("asset").unwrap().unwrap();
        let stored: PersistedColumnConfig = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.fields.get("host"), Some(&true));
        assert!(!stored.fields.contains_key(SELECT_FIELD));
    }

    #[test]
    fn test_unknown_field_is_noop() {
        let store = MemoryStore::new();
        let mut registry = registry(&store);
        let before = registry.columns().to_vec();
        assert!(!registry.set_hidden("nonexistent", true).unwrap());
        assert_eq!(registry.columns(), before.as_slice());
        assert_eq!(store.get("asset").unwrap(), None);
    }

    #[test]
    fn test_unknown_field_keeps_stored_layout() {
        let store = MemoryStore::new();
        store.set("asset", "not json").unwrap();
        let mut registry = registry(&store);

        assert!(!registry.set_hidden("nonexistent", true).unwrap());
        assert_eq!(store.get("asset").unwrap().as_deref(), Some("not json"));

        assert!(registry.set_hidden("host", true).unwrap());
        assert_ne!(store.get("asset").unwrap().as_deref(), Some("not json"));
    }

    #[test]
    fn test_select_is_never_restored() {
        let store = MemoryStore::new();
        store
            .set("asset", r#"{"select": true, "host": true, "statisticsHidden": true}"#)
            .unwrap();

        let registry = registry(&store);
        assert!(!registry.column(SELECT_FIELD).unwrap().hidden);
        assert!(registry.column("host").unwrap().hidden);
        assert!(registry.statistics_hidden());
    }

    #[test]
    fn test_missing_fields_keep_declared_default() {
        let store = MemoryStore::new();
        store.set("asset", r#"{"title": true}"#).unwrap();
        let columns = vec![
            ColumnSpec::new("title", "Title"),
            ColumnSpec::new("icon", "Icon").hidden(),
        ];
        let registry = ColumnRegistry::new("asset", columns, store).unwrap();
        assert!(registry.column("title").unwrap().hidden);
        assert!(registry.column("icon").unwrap().hidden);
    }

    #[test]
    fn test_corrupt_layout_keeps_defaults() {
        let store = MemoryStore::new();
        store.set("asset", "not json").unwrap();
        let registry = registry(&store);
        assert!(registry.columns().iter().all(|c| !c.hidden));
    }

    #[test]
    fn test_views_are_isolated() {
        let store = MemoryStore::new();
        let mut asset = registry(&store);
        asset.set_hidden("host", true).unwrap();

        let url = ColumnRegistry::new("url", sample_columns(), store.clone()).unwrap();
        assert!(!url.column("host").unwrap().hidden);
    }

    #[test]
    fn test_last_writer_wins() {
        let store = MemoryStore::new();
        let mut a = registry(&store);
        let mut b = registry(&store);
        a.set_hidden("host", true).unwrap();
        b.set_hidden("title", true).unwrap();

        let fresh = registry(&store);
        assert!(!fresh.column("host").unwrap().hidden);
        assert!(fresh.column("title").unwrap().hidden);
    }

    #[test]
    fn test_statistics_flag_roundtrip() {
        let store = MemoryStore::new();
        let mut registry = registry(&store);
        registry.set_statistics_hidden(true).unwrap();
        assert!(self::registry(&store).statistics_hidden());
    }

    #[test]
    fn test_visible_fields_skip_select_and_hidden() {
        let store = MemoryStore::new();
        let mut registry = registry(&store);
        registry.set_hidden("length", true).unwrap();
        assert_eq!(registry.visible_fields(), vec!["host", "statuscode", "title", "tags"]);
        assert_eq!(registry.visible_columns().count(), 5);
    }

    #[test]
    fn test_sled_backed_roundtrip() {
        let test_store = TestStore::new();
        let mut registry =
            ColumnRegistry::new("dirscan", sample_columns(), test_store.store()).unwrap();
        registry.set_hidden("statuscode", true).unwrap();

        let fresh = ColumnRegistry::new("dirscan", sample_columns(), test_store.store()).unwrap();
        assert!(fresh.column("statuscode").unwrap().hidden);
    }

    #[test]
    fn test_for_view() {
        let store = MemoryStore::new();
        let view = views::builtin("page_monitoring").unwrap();
        let registry = ColumnRegistry::for_view(&view, store).unwrap();
        assert_eq!(registry.view_id(), "page_monitoring");
        assert!(registry.column("response").unwrap().hidden);
    }
}
