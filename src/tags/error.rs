//! Error types for tag mutations

use thiserror::Error;

/// Errors that can occur while editing a row's tags
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TagMutationError {
    /// Blank tag values are never sent
    #[error("Tag must not be empty")]
    EmptyTag,

    /// Removing a tag from a row whose tags have not been fetched
    #[error("Tags of row '{0}' are not known yet")]
    UnknownRow(String),

    /// Removing a tag the row does not carry
    #[error("Row '{row_id}' has no tag '{tag}'")]
    NotPresent { row_id: String, tag: String },

    /// The backend refused the mutation
    #[error("Tag update rejected: {0}")]
    Rejected(String),

    /// The request never reached the backend
    #[error("Transport failure: {0}")]
    Transport(String),
}
