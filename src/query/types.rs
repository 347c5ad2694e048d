//! Query data structures
//!
//! This module defines the canonical query representation shared by the filter
//! model and the grid controller:
//! - `Query`: keyword, column filters, sort order and page
//! - `FilterValue`: a column filter's accepted values
//! - `SortSpec` / `SortDirection`: the active sort
//! - `PageSpec`: 1-based page index and page size

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default number of rows requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Accepted values of a single column filter
///
/// A column filter is either a single value (free-text column search) or an
/// allow-list of values picked from the column's filter options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FilterValue {
    /// One accepted value
    Single(String),
    /// Any of several accepted values
    Multiple(Vec<String>),
}

impl FilterValue {
    /// Build a filter value from raw input, normalizing it
    ///
    /// Blank entries and duplicates are dropped (first occurrence wins).
    /// Returns `None` when nothing is left, so callers can delete the key.
    #[must_use]
    pub fn normalized<I, S>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut kept: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            if value.trim().is_empty() || kept.contains(&value) {
                continue;
            }
            kept.push(value);
        }

        if kept.is_empty() {
            None
        } else {
            Some(Self::Multiple(kept))
        }
    }

    /// Build a single-valued filter, `None` for blank input
    #[must_use]
    pub fn single(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self::Single(value))
        }
    }

    /// All accepted values as a slice
    #[must_use]
    pub fn values(&self) -> &[String] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Multiple(values) => values,
        }
    }

    /// Check whether `value` is accepted
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.values().iter().any(|v| v == value)
    }

    /// Remove one value, returning the remaining filter or `None` if it emptied
    #[must_use]
    pub fn without(self, value: &str) -> Option<Self> {
        match self {
            Self::Single(v) if v == value => None,
            Self::Single(v) => Some(Self::Single(v)),
            Self::Multiple(values) => {
                let rest: Vec<String> = values.into_iter().filter(|v| v != value).collect();
                if rest.is_empty() {
                    None
                } else {
                    Some(Self::Multiple(rest))
                }
            }
        }
    }
}

/// Sort direction of a sortable column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Wire name understood by the backend
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }

    /// Parse `asc`/`desc` (or the long forms), case-insensitively
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Ascending),
            "desc" | "descending" => Some(Self::Descending),
            _ => None,
        }
    }
}

/// Active sort order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    #[must_use]
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Requested page (1-based index)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageSpec {
    index: u32,
    size: u32,
}

impl PageSpec {
    /// Create a page spec; zero index or size is clamped to 1
    #[must_use]
    pub fn new(index: u32, size: u32) -> Self {
        Self {
            index: index.max(1),
            size: size.max(1),
        }
    }

    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    pub fn set_index(&mut self, index: u32) {
        self.index = index.max(1);
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size.max(1);
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// Canonical query of one grid view
///
/// Invariant: `field_filters` never maps a field to an empty value set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Query {
    /// Opaque keyword expression, passed verbatim to the backend
    pub keyword: String,

    /// Column filters keyed by field name
    pub field_filters: BTreeMap<String, FilterValue>,

    /// Active sort, if any
    pub sort: Option<SortSpec>,

    /// Requested page
    pub page: PageSpec,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty query with the given page size
    #[must_use]
    pub fn with_page_size(size: u32) -> Self {
        Self {
            page: PageSpec::new(1, size),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_drops_blanks_and_duplicates() {
        let value = FilterValue::normalized(["404", "", "500", "404", "  "]).unwrap();
        assert_eq!(value.values(), ["404".to_string(), "500".to_string()]);
    }

    #[test]
    fn test_normalized_empty_is_none() {
        assert!(FilterValue::normalized(Vec::<String>::new()).is_none());
        assert!(FilterValue::normalized([" "]).is_none());
        assert!(FilterValue::single("").is_none());
    }

    #[test]
    fn test_without_removes_value() {
        let value = FilterValue::Multiple(vec!["a".into(), "b".into()]);
        let value = value.without("a").unwrap();
        assert_eq!(value.values(), ["b".to_string()]);
        assert!(value.without("b").is_none());
        assert!(FilterValue::Single("x".into()).without("x").is_none());
        assert_eq!(
            FilterValue::Single("x".into()).without("y"),
            Some(FilterValue::Single("x".into()))
        );
    }

    #[test]
    fn test_page_spec_clamps_zero() {
        let mut page = PageSpec::new(0, 0);
        assert_eq!(page.index(), 1);
        assert_eq!(page.size(), 1);
        page.set_index(0);
        assert_eq!(page.index(), 1);
    }

    #[test]
    fn test_sort_direction_parse() {
        assert_eq!(SortDirection::parse("ASC"), Some(SortDirection::Ascending));
        assert_eq!(SortDirection::parse("descending"), Some(SortDirection::Descending));
        assert_eq!(SortDirection::parse("up"), None);
        assert_eq!(SortDirection::Descending.as_str(), "descending");
    }
}
