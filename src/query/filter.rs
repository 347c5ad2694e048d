//! Structured filter model
//!
//! `FilterModel` accumulates the user's search keyword, column filters and sort
//! order into a canonical [`Query`]. Every mutation reports how the grid should
//! refetch through [`Refetch`].
//!
//! Active column filters can be flattened into removable `field=value` chips:
//!
//! ```
//! use assetgrid::query::FilterModel;
//!
//! let mut model = FilterModel::default();
//! model.apply_column_filter("status", ["404", "500"]);
//! assert_eq!(model.to_active_filter_tags(), vec!["status=404", "status=500"]);
//!
//! model.remove_filter_tag("status=404");
//! assert_eq!(model.to_active_filter_tags(), vec!["status=500"]);
//! ```

use super::types::{FilterValue, Query, SortDirection, SortSpec};

/// How the grid must refetch after a query mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refetch {
    /// Reload starting from page 1
    FromFirstPage,
    /// Reload keeping the current page index
    PreservePage,
    /// Nothing changed
    None,
}

/// Separator between field and value in an active filter tag
pub const TAG_SEPARATOR: char = '=';

/// Filter state of one grid view
#[derive(Debug, Clone, Default)]
pub struct FilterModel {
    query: Query,
}

impl FilterModel {
    /// Create a filter model around an initial query
    #[must_use]
    pub const fn new(query: Query) -> Self {
        Self { query }
    }

    /// Current query snapshot
    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    /// Current keyword expression
    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.query.keyword
    }

    /// Replace the keyword and go back to page 1
    pub fn set_keyword(&mut self, keyword: impl Into<String>) -> Refetch {
        self.query.keyword = keyword.into();
        self.query.page.set_index(1);
        Refetch::FromFirstPage
    }

    /// Replace the accepted values of one column
    ///
    /// `values` is the column's complete selection; it is normalized and an
    /// empty selection deletes the filter.
    pub fn apply_column_filter<I, S>(&mut self, field: &str, values: I) -> Refetch
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match FilterValue::normalized(values) {
            Some(value) => {
                self.query.field_filters.insert(field.to_string(), value);
            }
            None => {
                self.query.field_filters.remove(field);
            }
        }
        Refetch::PreservePage
    }

    /// Set a single-valued filter (column search box), blank clears it
    pub fn set_field_value(&mut self, field: &str, value: impl Into<String>) -> Refetch {
        match FilterValue::single(value) {
            Some(value) => {
                self.query.field_filters.insert(field.to_string(), value);
            }
            None => {
                self.query.field_filters.remove(field);
            }
        }
        Refetch::PreservePage
    }

    /// Replace the sort order, `None` clears it
    pub fn apply_sort(&mut self, field: &str, direction: Option<SortDirection>) -> Refetch {
        self.query.sort = direction.map(|direction| SortSpec::new(field, direction));
        Refetch::PreservePage
    }

    /// Remove every column filter
    pub fn clear_filters(&mut self) -> Refetch {
        if self.query.field_filters.is_empty() {
            return Refetch::None;
        }
        self.query.field_filters.clear();
        Refetch::PreservePage
    }

    /// Set the page index (clamped to 1)
    pub fn set_page(&mut self, index: u32) -> Refetch {
        self.query.page.set_index(index);
        Refetch::PreservePage
    }

    /// Set the page size; the page index is left untouched
    pub fn set_page_size(&mut self, size: u32) -> Refetch {
        self.query.page.set_size(size);
        Refetch::PreservePage
    }

    /// Flatten the column filters into `field=value` display tags
    #[must_use]
    pub fn to_active_filter_tags(&self) -> Vec<String> {
        self.query
            .field_filters
            .iter()
            .flat_map(|(field, value)| {
                value
                    .values()
                    .iter()
                    .map(move |v| format!("{field}{TAG_SEPARATOR}{v}"))
            })
            .collect()
    }

    /// Remove the pair named by a `field=value` tag
    ///
    /// Only the first `=` separates field from value, so values containing
    /// `=` survive intact. Returns `true` when a value was removed.
    pub fn remove_filter_tag(&mut self, tag: &str) -> bool {
        let Some((field, value)) = tag.split_once(TAG_SEPARATOR) else {
            return false;
        };

        let Some(current) = self.query.field_filters.remove(field) else {
            return false;
        };

        let removed = current.contains(value);
        if let Some(rest) = current.without(value) {
            self.query.field_filters.insert(field.to_string(), rest);
        }
        removed
    }
}
