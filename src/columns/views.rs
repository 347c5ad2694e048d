//! Built-in view definitions
//!
//! Each asset table of the console is a view: a stable identifier, the backend
//! collection its rows come from and its compile-time columns. Views can be
//! added or overridden from the configuration file.

use super::types::{ColumnSpec, SELECT_FIELD};
use crate::grid::Density;
use serde::{Deserialize, Serialize};

const HTTP_STATUS_OPTIONS: [&str; 8] = ["200", "301", "302", "400", "401", "403", "404", "500"];

/// Definition of one grid view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewDefinition {
    /// Stable identifier, also the column layout storage key
    pub id: String,

    /// Backend collection (`index` of search requests, `tp` of tag requests)
    pub collection: String,

    #[serde(default)]
    pub density: Density,

    pub columns: Vec<ColumnSpec>,
}

impl ViewDefinition {
    #[must_use]
    pub fn new(id: &str, collection: &str, columns: Vec<ColumnSpec>) -> Self {
        Self {
            id: id.to_string(),
            collection: collection.to_string(),
            density: Density::Regular,
            columns,
        }
    }

    #[must_use]
    pub const fn dense(mut self) -> Self {
        self.density = Density::Dense;
        self
    }
}

/// Identifiers of the built-in views
pub const BUILTIN_VIEWS: [&str; 6] = [
    "asset",
    "subdomain",
    "url",
    "dirscan",
    "page_monitoring",
    "sensitive",
];

fn select() -> ColumnSpec {
    ColumnSpec::new(SELECT_FIELD, "")
}

fn tags() -> ColumnSpec {
    ColumnSpec::new("tags", "Tags")
}

fn time() -> ColumnSpec {
    ColumnSpec::new("time", "Time").sortable()
}

/// Look up a built-in view by identifier
#[must_use]
pub fn builtin(id: &str) -> Option<ViewDefinition> {
    let view = match id {
        "asset" => ViewDefinition::new(
            id,
            "asset",
            vec![
                select(),
                ColumnSpec::new("host", "Domain"),
                ColumnSpec::new("ip", "IP"),
                ColumnSpec::new("port", "Port").sortable(),
                ColumnSpec::new("service", "Service"),
                ColumnSpec::new("title", "Title"),
                ColumnSpec::new("statuscode", "Status").with_filter_options(HTTP_STATUS_OPTIONS),
                ColumnSpec::new("technologies", "Apps"),
                ColumnSpec::new("faviconmmh3", "Icon").hidden(),
                time(),
                tags(),
            ],
        )
        .dense(),
        "subdomain" => ViewDefinition::new(
            id,
            "subdomain",
            vec![
                select(),
                ColumnSpec::new("host", "Subdomain"),
                ColumnSpec::new("type", "Type").with_filter_options(["A", "AAAA", "CNAME", "NS", "MX", "TXT"]),
                ColumnSpec::new("value", "Record"),
                ColumnSpec::new("ip", "IP"),
                time(),
                tags(),
            ],
        ),
        "url" => ViewDefinition::new(
            id,
            "UrlScan",
            vec![
                select(),
                ColumnSpec::new("input", "Input"),
                ColumnSpec::new("source", "Source"),
                ColumnSpec::new("outputtype", "Type"),
                ColumnSpec::new("output", "URL"),
                ColumnSpec::new("statuscode", "Status").with_filter_options(HTTP_STATUS_OPTIONS),
                ColumnSpec::new("length", "Length").sortable(),
                time(),
                tags(),
            ],
        ),
        "dirscan" => ViewDefinition::new(
            id,
            "DirScanResult",
            vec![
                select(),
                ColumnSpec::new("url", "URL"),
                ColumnSpec::new("status", "Status").with_filter_options(HTTP_STATUS_OPTIONS),
                ColumnSpec::new("length", "Length").sortable(),
                ColumnSpec::new("msg", "Redirect"),
                tags(),
            ],
        ),
        "page_monitoring" => ViewDefinition::new(
            id,
            "PageMonitoring",
            vec![
                select(),
                ColumnSpec::new("url", "URL"),
                ColumnSpec::new("hash", "Hash"),
                ColumnSpec::new("diff", "Diff"),
                ColumnSpec::new("response", "Response").hidden(),
                time(),
                tags(),
            ],
        ),
        "sensitive" => ViewDefinition::new(
            id,
            "SensitiveResult",
            vec![
                select(),
                ColumnSpec::new("url", "URL"),
                ColumnSpec::new("sid", "Rule"),
                ColumnSpec::new("match", "Match"),
                ColumnSpec::new("color", "Level").with_filter_options(["red", "orange", "yellow", "green", "cyan"]),
                ColumnSpec::new("status", "Handled").with_filter_options(["1", "2", "3", "4"]),
                time(),
                tags(),
            ],
        ),
        _ => return None,
    };
    Some(view)
}
