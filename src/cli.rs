//! Command-line interface definitions and parsing
//!
//! This module defines the CLI of the `assetgrid` binary using the `clap`
//! crate. The binary is a headless front end of the grid: it builds backend
//! requests, pages through a local JSON data set and edits the persisted
//! column layout of a view.
//!
//! # Commands
//!
//! - **request**: Print the backend search request for a query
//! - **fetch**: Run a query against a local JSON file and render the page
//! - **columns**: List, hide or show the columns of a view
//! - **keyword**: Check and normalize a keyword expression
//! - **views**: List the known views
//!
//! # Examples
//!
//! ```
//! use assetgrid::cli::{Cli, Commands};
//! use clap::Parser;
//!
//! let cli = Cli::parse_from(["assetgrid", "request", "--view", "url", "-f", "statuscode=404"]);
//! assert!(matches!(cli.command, Commands::Request { .. }));
//! ```

use crate::GridError;
use crate::output::OutputFormat;
use crate::query::{FilterModel, Query, SortDirection};
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// View used when none is given
pub const DEFAULT_VIEW: &str = "asset";

#[derive(Parser, Debug)]
#[command(name = "assetgrid")]
#[command(author, version, about = "Server-driven asset grid controller", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the backend search request for a query
    #[command(visible_alias = "r")]
    Request {
        #[arg(short, long, default_value = DEFAULT_VIEW)]
        view: String,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Run a query against a local JSON data set and render the page
    #[command(visible_alias = "f")]
    Fetch {
        /// JSON file holding an array of rows or a `{"list": [...]}` object
        #[arg(short, long, value_name = "FILE")]
        source: PathBuf,

        #[arg(short, long, default_value = DEFAULT_VIEW)]
        view: String,

        #[command(flatten)]
        query: QueryArgs,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Show or change the column layout of a view
    #[command(visible_alias = "c")]
    Columns {
        #[command(subcommand)]
        command: ColumnCommands,
    },

    /// Check a keyword expression and print its normalized form
    #[command(visible_alias = "k")]
    Keyword {
        /// Expression such as `title="admin" && statuscode!="404"`
        expression: String,
    },

    /// List the known views
    Views,
}

#[derive(Subcommand, Debug)]
pub enum ColumnCommands {
    /// List the columns of a view with their visibility
    List {
        #[arg(short, long, default_value = DEFAULT_VIEW)]
        view: String,
    },

    /// Hide columns
    Hide {
        #[arg(short, long, default_value = DEFAULT_VIEW)]
        view: String,

        #[arg(required = true, value_name = "FIELD")]
        fields: Vec<String>,
    },

    /// Show columns
    Show {
        #[arg(short, long, default_value = DEFAULT_VIEW)]
        view: String,

        #[arg(required = true, value_name = "FIELD")]
        fields: Vec<String>,
    },

    /// Show or hide the statistics panel of a view
    Statistics {
        #[arg(short, long, default_value = DEFAULT_VIEW)]
        view: String,

        #[arg(value_enum)]
        visibility: Visibility,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Show,
    Hide,
}

impl Visibility {
    #[must_use]
    pub const fn hidden(self) -> bool {
        matches!(self, Self::Hide)
    }
}

/// Query options shared by `request` and `fetch`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Keyword expression
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Column filter; repeat a field to select several values
    #[arg(short = 'f', long = "filter", value_name = "FIELD=VALUE")]
    pub filters: Vec<String>,

    /// Sort field
    #[arg(long, value_name = "FIELD")]
    pub sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Page index, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: u32,

    /// Rows per page; the configured default if omitted
    #[arg(long)]
    pub page_size: Option<u32>,
}

impl QueryArgs {
    /// Group `FIELD=VALUE` filters by field, keeping value order
    ///
    /// # Errors
    ///
    /// Returns `GridError::InvalidInput` for a filter without `=` or field.
    pub fn grouped_filters(&self) -> Result<BTreeMap<&str, Vec<&str>>, GridError> {
        let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for filter in &self.filters {
            let (field, value) = filter
                .split_once('=')
                .filter(|(field, _)| !field.trim().is_empty())
                .ok_or_else(|| GridError::InvalidInput(format!("filter '{filter}' is not FIELD=VALUE")))?;
            grouped.entry(field.trim()).or_default().push(value);
        }
        Ok(grouped)
    }

    /// Build the query these options describe on top of `base`
    ///
    /// # Errors
    ///
    /// Returns `GridError::InvalidInput` for a malformed filter.
    pub fn to_query(&self, base: Query) -> Result<Query, GridError> {
        let mut model = FilterModel::new(base);
        if let Some(size) = self.page_size {
            model.set_page_size(size);
        }
        for (field, values) in self.grouped_filters()? {
            model.apply_column_filter(field, values);
        }
        if let Some(field) = &self.sort {
            let direction = if self.desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            model.apply_sort(field, Some(direction));
        }
        if let Some(keyword) = &self.keyword {
            model.set_keyword(keyword.as_str());
        }
        model.set_page(self.page);
        Ok(model.query().clone())
    }
}
