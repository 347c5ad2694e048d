//! Column data structures
//!
//! - `ColumnSpec`: one column of a view, identified by its field
//! - `FilterOption`: a selectable value of a column filter
//! - `PersistedColumnConfig`: the stored visibility layout of a view

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pseudo-field of the row selection column, never persisted
pub const SELECT_FIELD: &str = "select";

/// A selectable value of a column filter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterOption {
    pub text: String,
    pub value: String,
}

impl FilterOption {
    #[must_use]
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
        }
    }
}

/// One column of a grid view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Row field rendered by the column; the column's identity
    pub field: String,

    /// Header text
    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub hidden: bool,

    #[serde(default)]
    pub sortable: bool,

    /// Values offered by the column's filter dropdown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_options: Option<Vec<FilterOption>>,
}

impl ColumnSpec {
    /// Create a visible, unsortable, unfiltered column
    #[must_use]
    pub fn new(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            label: label.into(),
            hidden: false,
            sortable: false,
            filter_options: None,
        }
    }

    #[must_use]
    pub const fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Start hidden until the user shows the column
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Offer a filter dropdown whose option text equals its value
    #[must_use]
    pub fn with_filter_options<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_options = Some(
            values
                .into_iter()
                .map(|v| {
                    let v = v.into();
                    FilterOption::new(v.clone(), v)
                })
                .collect(),
        );
        self
    }

    #[must_use]
    pub fn is_select(&self) -> bool {
        self.field == SELECT_FIELD
    }
}

/// Stored visibility layout of one view
///
/// Serialized as a flat JSON object: one `"<field>": <hidden>` entry per
/// column plus `"statisticsHidden"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedColumnConfig {
    #[serde(rename = "statisticsHidden", default)]
    pub statistics_hidden: bool,

    #[serde(flatten)]
    pub fields: BTreeMap<String, bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_config_is_flat() {
        let mut config = PersistedColumnConfig::default();
        config.fields.insert("host".into(), true);
        config.fields.insert("title".into(), false);
        config.statistics_hidden = true;

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"host": true, "title": false, "statisticsHidden": true})
        );

        let back: PersistedColumnConfig = serde_json::from_value(value).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_persisted_config_missing_statistics_flag() {
        let config: PersistedColumnConfig = serde_json::from_str(r#"{"host": true}"#).unwrap();
        assert!(!config.statistics_hidden);
        assert_eq!(config.fields.get("host"), Some(&true));
    }

    #[test]
    fn test_column_builders() {
        let column = ColumnSpec::new("statuscode", "Status")
            .sortable()
            .with_filter_options(["200", "404"]);
        assert!(column.sortable);
        assert!(!column.hidden);
        assert_eq!(column.filter_options.unwrap()[1], FilterOption::new("404", "404"));
        assert!(ColumnSpec::new(SELECT_FIELD, "").is_select());
    }
}
