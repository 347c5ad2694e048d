//! Key-value stores for column layouts
//!
//! `ConfigStore` is the injected persistence seam of [`super::ColumnRegistry`].
//! Two implementations are provided:
//! - `MemoryStore`: process-local, cloneable handle to a shared map
//! - `SledStore`: durable, backed by a sled tree named `columns`

use super::error::StorageError;
use sled::{Db, Tree};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Synchronous string key-value store
pub trait ConfigStore {
    /// Read the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: ConfigStore + ?Sized> ConfigStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

impl<S: ConfigStore + ?Sized> ConfigStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// In-memory store; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Durable store backed by sled
pub struct SledStore {
    db: Db,
    columns: Tree,
}

impl SledStore {
    /// Opens or creates a store at the specified path
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the database or its tree cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        let columns = db.open_tree("columns")?;
        Ok(Self { db, columns })
    }

    /// Keys currently stored, i.e. the views with a saved layout
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if iteration fails or a key is not UTF-8.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.columns
            .iter()
            .keys()
            .map(|key| {
                let key = key?;
                String::from_utf8(key.to_vec())
                    .map_err(|e| StorageError::Serialization(e.to_string()))
            })
            .collect()
    }

    /// Flush pending writes to disk
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the flush fails.
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

impl ConfigStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.columns
            .get(key.as_bytes())?
            .map(|bytes| {
                String::from_utf8(bytes.to_vec())
                    .map_err(|e| StorageError::Serialization(e.to_string()))
            })
            .transpose()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.columns.insert(key.as_bytes(), value.as_bytes())?;
        Ok(())
    }
}
