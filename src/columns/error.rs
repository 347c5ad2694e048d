//! Storage error types
//!
//! - **`Sled`**: errors from the underlying sled embedded database
//! - **`Serialization`**: a layout could not be encoded or the stored bytes are not UTF-8
//! - **`Poisoned`**: a shared in-memory store lock was poisoned

use thiserror::Error;

/// Errors from a column layout store
#[derive(Debug, Error)]
pub enum StorageError {
    /// Represents a sled database error
    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),

    /// Generic serialization/deserialization error
    #[error("Error during serialization: {0}")]
    Serialization(String),

    /// A lock guarding shared state was poisoned
    #[error("Store lock poisoned")]
    Poisoned,
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
