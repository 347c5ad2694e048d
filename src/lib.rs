//! Assetgrid - a server-driven data grid controller
//!
//! This library provides the state behind the asset tables of a security
//! scanning console: a structured filter model translated into backend
//! requests, a paged fetch state machine, optimistic per-row tag editing and
//! per-view column layouts persisted in a key-value store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub mod cli;
pub mod columns;
pub mod config;
pub mod grid;
pub mod output;
pub mod query;
pub mod tags;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum GridError {
    /// Remote fetch failed
    #[error("Fetch error: {0}")]
    Fetch(#[from] grid::FetchError),
    /// Tag mutation failed
    #[error("Tag error: {0}")]
    Tag(#[from] tags::TagMutationError),
    /// Column layout storage failed
    #[error("Storage error: {0}")]
    Storage(#[from] columns::StorageError),
    /// Keyword expression could not be parsed
    #[error("Keyword error: {0}")]
    Keyword(#[from] query::KeywordError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
    /// Represents a JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Represents a CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Name of the row field holding the row's tags
pub const TAGS_FIELD: &str = "tags";

/// One record returned by a data source
///
/// The backend's `id` becomes [`Row::id`]; every other key is kept as-is in
/// [`Row::fields`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Row {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Row {
    /// Create a new Row
    #[must_use]
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Raw value of a field
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        if name == "id" {
            return None;
        }
        self.fields.get(name)
    }

    /// Text form of every value of a field
    ///
    /// Arrays yield one entry per element; missing and null fields yield none.
    #[must_use]
    pub fn text_values(&self, name: &str) -> Vec<String> {
        if name == "id" {
            return vec![self.id.clone()];
        }
        match self.fields.get(name) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .filter(|v| !v.is_null())
                .map(value_text)
                .collect(),
            Some(other) => vec![value_text(other)],
        }
    }

    /// Field rendered as a single display string
    #[must_use]
    pub fn display_value(&self, name: &str) -> String {
        self.text_values(name).join(", ")
    }

    /// Tags attached to the row
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        self.text_values(TAGS_FIELD)
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
