//! Tag mutation endpoint contract

use super::error::TagMutationError;
use async_trait::async_trait;

/// Backend persisting tag changes
///
/// `collection` names the backend collection the row belongs to
/// (`asset`, `subdomain`, `UrlScan`, ...).
#[async_trait]
pub trait TagEndpoint {
    /// Append `tag` to the row's tags
    ///
    /// # Errors
    ///
    /// Returns `TagMutationError` if the backend rejects or cannot be reached.
    async fn add_tag(&self, row_id: &str, collection: &str, tag: &str)
    -> Result<(), TagMutationError>;

    /// Remove `tag` from the row's tags
    ///
    /// # Errors
    ///
    /// Returns `TagMutationError` if the backend rejects or cannot be reached.
    async fn remove_tag(
        &self,
        row_id: &str,
        collection: &str,
        tag: &str,
    ) -> Result<(), TagMutationError>;
}
