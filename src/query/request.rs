//! Backend request encoding
//!
//! A [`FetchRequest`] is the query snapshot handed to a data source when a
//! fetch is dispatched. [`SearchRequest`] is its JSON wire form as the REST
//! backend expects it:
//!
//! ```json
//! {
//!   "index": "asset",
//!   "search": "title=\"admin\"",
//!   "pageIndex": 1,
//!   "pageSize": 20,
//!   "filter": { "statuscode": ["200", "302"] },
//!   "sort": { "length": "ascending" }
//! }
//! ```

use super::types::{FilterValue, Query, SortSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query snapshot taken at dispatch time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub keyword: String,
    pub page_index: u32,
    pub page_size: u32,
    pub field_filters: BTreeMap<String, FilterValue>,
    pub sort: Option<SortSpec>,
}

impl From<&Query> for FetchRequest {
    fn from(query: &Query) -> Self {
        Self {
            keyword: query.keyword.clone(),
            page_index: query.page.index(),
            page_size: query.page.size(),
            field_filters: query.field_filters.clone(),
            sort: query.sort.clone(),
        }
    }
}

impl FetchRequest {
    /// Zero-based offset of the first requested row
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page_index.saturating_sub(1) as usize) * self.page_size as usize
    }

    /// Encode for the backend collection `index`
    #[must_use]
    pub fn to_search_request(&self, index: &str) -> SearchRequest {
        SearchRequest {
            index: index.to_string(),
            search: self.keyword.clone(),
            page_index: self.page_index,
            page_size: self.page_size,
            filter: self
                .field_filters
                .iter()
                .map(|(field, value)| (field.clone(), value.values().to_vec()))
                .collect(),
            sort: self
                .sort
                .iter()
                .map(|s| (s.field.clone(), s.direction.as_str().to_string()))
                .collect(),
        }
    }
}

/// JSON body of a paged search request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub index: String,
    pub search: String,
    pub page_index: u32,
    pub page_size: u32,
    #[serde(default)]
    pub filter: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sort: BTreeMap<String, String>,
}

impl SearchRequest {
    /// Render as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
