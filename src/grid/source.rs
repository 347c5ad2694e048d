//! Data source contract
//!
//! The grid never talks HTTP itself. A [`DataSource`] receives the dispatched
//! [`FetchRequest`] and answers with one [`Page`]. [`MemorySource`] is an
//! in-process implementation that understands the backend's keyword grammar,
//! used for offline inspection and tests.

use super::error::FetchError;
use crate::Row;
use crate::query::{FetchRequest, KeywordExpr, SortDirection};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One page of results
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Page {
    /// Rows of the requested page
    pub list: Vec<Row>,
    /// Number of rows matching the query across all pages
    pub total: u64,
}

/// Backend able to answer paged queries
#[async_trait]
pub trait DataSource {
    /// Fetch the page described by `request`
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the backend cannot be reached or rejects the query.
    async fn fetch(&self, request: &FetchRequest) -> Result<Page, FetchError>;
}

/// Data source over an in-memory row set
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<Row>,
}

impl MemorySource {
    #[must_use]
    pub const fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Load rows from JSON: either a bare array or a `{ "list": [...] }` page
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Decode` if the JSON matches neither shape.
    pub fn from_json(json: &str) -> Result<Self, FetchError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Document {
            Rows(Vec<Row>),
            Page { list: Vec<Row> },
        }

        let rows = match serde_json::from_str::<Document>(json)? {
            Document::Rows(rows) | Document::Page { list: rows } => rows,
        };
        Ok(Self::new(rows))
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Evaluate a request synchronously
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Backend` with code 400 for an unparseable keyword.
    pub fn query(&self, request: &FetchRequest) -> Result<Page, FetchError> {
        let expr = KeywordExpr::parse(&request.keyword).map_err(|e| FetchError::Backend {
            code: 400,
            message: e.to_string(),
        })?;

        let mut matched: Vec<&Row> = self
            .rows
            .iter()
            .filter(|row| expr.as_ref().is_none_or(|e| e.matches(row)))
            .filter(|row| {
                request.field_filters.iter().all(|(field, accepted)| {
                    row.text_values(field).iter().any(|v| accepted.contains(v))
                })
            })
            .collect();

        if let Some(sort) = &request.sort {
            matched.sort_by(|a, b| {
                let ord = compare_field(a, b, &sort.field);
                match sort.direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }

        let total = matched.len() as u64;
        let list = matched
            .into_iter()
            .skip(request.offset())
            .take(request.page_size as usize)
            .cloned()
            .collect();

        Ok(Page { list, total })
    }
}

fn compare_field(a: &Row, b: &Row, field: &str) -> Ordering {
    let left = a.display_value(field);
    let right = b.display_value(field);
    match (left.parse::<f64>(), right.parse::<f64>()) {
        (Ok(l), Ok(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
        _ => left.cmp(&right),
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn fetch(&self, request: &FetchRequest) -> Result<Page, FetchError> {
        self.query(request)
    }
}
