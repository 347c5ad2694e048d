//! Testing utilities for assetgrid
//!
//! This module provides fixture rows, a scripted data source, recording tag
//! and delete endpoints and a temporary sled store.
//!
//! Only available when compiled with `cfg(test)`.

use crate::Row;
use crate::columns::{ColumnSpec, SledStore};
use crate::grid::{DataSource, DeleteEndpoint, DeleteRequest, FetchError, Page};
use crate::query::FetchRequest;
use crate::tags::{TagEndpoint, TagMutationError, TagRequest};
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;
use tempfile::TempDir;

const STATUS_CODES: [u16; 4] = [200, 404, 302, 500];

/// Build `count` asset rows with ids `row-0`, `row-1`, ...
#[must_use]
pub fn sample_rows(count: usize) -> Vec<Row> {
    (0..count)
        .map(|i| {
            let tags: Vec<&str> = if i % 3 == 0 { vec!["prod"] } else { Vec::new() };
            serde_json::from_value(json!({
                "id": format!("row-{i}"),
                "host": format!("host-{i}.example.com"),
                "statuscode": STATUS_CODES[i % STATUS_CODES.len()],
                "length": (i * 37) % 101,
                "title": format!("Page {i}"),
                "tags": tags,
            }))
            .expect("fixture row is valid")
        })
        .collect()
}

/// Wrap rows in a page with an explicit total
#[must_use]
pub fn page_of(rows: Vec<Row>, total: u64) -> Page {
    Page { list: rows, total }
}

/// Columns of a small asset view
#[must_use]
pub fn sample_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("select", ""),
        ColumnSpec::new("host", "Host").sortable(),
        ColumnSpec::new("statuscode", "Status").with_filter_options(["200", "302", "404", "500"]),
        ColumnSpec::new("title", "Title"),
        ColumnSpec::new("length", "Length").sortable(),
        ColumnSpec::new("tags", "Tags"),
    ]
}

/// Data source answering from a script of responses
///
/// Responses are popped in order; once the script runs out the fallback is
/// returned (an empty page unless built with [`ScriptedSource::failing`]).
#[derive(Debug, Default)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Page, FetchError>>>,
    fallback: Option<FetchError>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl ScriptedSource {
    #[must_use]
    pub fn new(responses: Vec<Result<Page, FetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Self::default()
        }
    }

    /// Source that fails every request with `error`
    #[must_use]
    pub fn failing(error: FetchError) -> Self {
        Self {
            fallback: Some(error),
            ..Self::default()
        }
    }

    /// Requests received so far
    #[must_use]
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl DataSource for ScriptedSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<Page, FetchError> {
        self.requests.lock().expect("requests lock").push(request.clone());
        let scripted = self.responses.lock().expect("responses lock").pop_front();
        match (scripted, &self.fallback) {
            (Some(response), _) => response,
            (None, Some(error)) => Err(error.clone()),
            (None, None) => Ok(Page::default()),
        }
    }
}

/// Tag endpoint that records every request and optionally rejects them
#[derive(Debug, Default)]
pub struct RecordingEndpoint {
    reject_with: Option<String>,
    added: Mutex<Vec<TagRequest>>,
    removed: Mutex<Vec<TagRequest>>,
}

impl RecordingEndpoint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Endpoint rejecting every mutation with `message`
    #[must_use]
    pub fn rejecting(message: &str) -> Self {
        Self {
            reject_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn added(&self) -> Vec<TagRequest> {
        self.added.lock().expect("added lock").clone()
    }

    #[must_use]
    pub fn removed(&self) -> Vec<TagRequest> {
        self.removed.lock().expect("removed lock").clone()
    }

    fn outcome(&self) -> Result<(), TagMutationError> {
        match &self.reject_with {
            Some(message) => Err(TagMutationError::Rejected(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TagEndpoint for RecordingEndpoint {
    async fn add_tag(
        &self,
        row_id: &str,
        collection: &str,
        tag: &str,
    ) -> Result<(), TagMutationError> {
        self.added
            .lock()
            .expect("added lock")
            .push(TagRequest::new(collection, row_id, tag));
        self.outcome()
    }

    async fn remove_tag(
        &self,
        row_id: &str,
        collection: &str,
        tag: &str,
    ) -> Result<(), TagMutationError> {
        self.removed
            .lock()
            .expect("removed lock")
            .push(TagRequest::new(collection, row_id, tag));
        self.outcome()
    }
}

/// Delete endpoint that records every request and optionally fails them
#[derive(Debug, Default)]
pub struct RecordingDeleter {
    fail_with: Option<FetchError>,
    requests: Mutex<Vec<DeleteRequest>>,
}

impl RecordingDeleter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Endpoint failing every request with `error`
    #[must_use]
    pub fn rejecting(error: FetchError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn requests(&self) -> Vec<DeleteRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl DeleteEndpoint for RecordingDeleter {
    async fn delete(&self, request: &DeleteRequest) -> Result<(), FetchError> {
        self.requests.lock().expect("requests lock").push(request.clone());
        self.fail_with.clone().map_or(Ok(()), Err)
    }
}

/// Sled-backed store in a temporary directory, removed on drop
pub struct TestStore {
    _dir: TempDir,
    store: SledStore,
}

impl TestStore {
    /// # Panics
    /// Panics if the temporary directory or the database cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = SledStore::open(dir.path().join("columns.db")).expect("Failed to open test store");
        Self { _dir: dir, store }
    }

    #[must_use]
    pub const fn store(&self) -> &SledStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_rows() {
        let rows = sample_rows(4);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1].id, "row-1");
        assert_eq!(rows[1].display_value("statuscode"), "404");
        assert_eq!(rows[0].tags(), vec!["prod".to_string()]);
        assert!(rows[1].tags().is_empty());
    }

    #[tokio::test]
    async fn test_scripted_source_order_and_fallback() {
        let source = ScriptedSource::new(vec![Ok(page_of(sample_rows(1), 1))]);
        let request = FetchRequest::from(&crate::query::Query::default());

        assert_eq!(source.fetch(&request).await.unwrap().total, 1);
        assert_eq!(source.fetch(&request).await.unwrap(), Page::default());
        assert_eq!(source.requests().len(), 2);
    }
}
