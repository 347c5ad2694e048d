//! Query model
//!
//! This module turns user intent (keyword search, column filters, sort order,
//! paging) into the canonical [`Query`] a grid fetches with.
//!
//! # Components
//!
//! - **`FilterModel`**: mutates the query and reports how to refetch
//! - **`KeywordExpr`**: the backend's boolean search grammar
//! - **`FetchRequest` / `SearchRequest`**: dispatch snapshot and its JSON body

pub mod error;
pub mod filter;
pub mod keyword;
pub mod request;
pub mod types;

pub use error::KeywordError;
pub use filter::{FilterModel, Refetch};
pub use keyword::{Comparison, KeywordExpr, Term};
pub use request::{FetchRequest, SearchRequest};
pub use types::{DEFAULT_PAGE_SIZE, FilterValue, PageSpec, Query, SortDirection, SortSpec};
