//! Output formatting for CLI display
//!
//! This module renders grid rows restricted to the visible columns of a view,
//! as an aligned table, CSV or JSON, plus the small status lines the CLI prints
//! around them.

use crate::columns::ColumnSpec;
use crate::grid::GridState;
use crate::{GridError, Row, TAGS_FIELD};
use clap::ValueEnum;
use colored::Colorize;
use serde_json::{Map, Value};

/// Widest a table cell may get before it is truncated
pub const MAX_CELL_WIDTH: usize = 40;

/// Rendering of fetched rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

/// Render rows in the requested format
///
/// # Errors
///
/// Returns `GridError` if CSV or JSON encoding fails.
pub fn render(rows: &[Row], columns: &[&ColumnSpec], format: OutputFormat) -> Result<String, GridError> {
    match format {
        OutputFormat::Table => Ok(render_table(rows, columns)),
        OutputFormat::Csv => render_csv(rows, columns),
        OutputFormat::Json => Ok(render_json(rows, columns)?),
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_WIDTH {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_CELL_WIDTH - 3).collect();
    cut.push_str("...");
    cut
}

fn header(column: &ColumnSpec) -> &str {
    if column.label.is_empty() {
        &column.field
    } else {
        &column.label
    }
}

/// Render rows as an aligned table with a bold header line
#[must_use]
pub fn render_table(rows: &[Row], columns: &[&ColumnSpec]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| truncate(&row.display_value(&c.field)))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|line| line[i].chars().count())
                .chain(std::iter::once(header(c).chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = Vec::with_capacity(rows.len() + 1);
    let head: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, &w)| format!("{:<w$}", header(c)).bold().to_string())
        .collect();
    out.push(head.join("  ").trim_end().to_string());

    for line in &cells {
        let rendered: Vec<String> = columns
            .iter()
            .zip(line.iter().zip(&widths))
            .map(|(c, (cell, &w))| {
                let padded = format!("{cell:<w$}");
                if c.field == TAGS_FIELD {
                    padded.cyan().to_string()
                } else {
                    padded
                }
            })
            .collect();
        out.push(rendered.join("  ").trim_end().to_string());
    }

    out.join("\n")
}

/// Render rows as CSV, `id` first, then one column per field
///
/// # Errors
///
/// Returns `GridError` if a record cannot be written.
pub fn render_csv(rows: &[Row], columns: &[&ColumnSpec]) -> Result<String, GridError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut head = vec!["id"];
    head.extend(columns.iter().map(|c| c.field.as_str()));
    writer.write_record(&head)?;

    for row in rows {
        let mut record = vec![row.id.clone()];
        record.extend(columns.iter().map(|c| row.display_value(&c.field)));
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| GridError::InvalidInput(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| GridError::InvalidInput(e.to_string()))
}

/// Render rows as a JSON array holding `id` and the given fields only
///
/// # Errors
///
/// Returns `serde_json::Error` if encoding fails.
pub fn render_json(rows: &[Row], columns: &[&ColumnSpec]) -> Result<String, serde_json::Error> {
    let projected: Vec<Value> = rows
        .iter()
        .map(|row| {
            let mut object = Map::new();
            object.insert("id".to_string(), Value::String(row.id.clone()));
            for column in columns {
                let value = row.field(&column.field).cloned().unwrap_or(Value::Null);
                object.insert(column.field.clone(), value);
            }
            Value::Object(object)
        })
        .collect();
    serde_json::to_string_pretty(&projected)
}

/// Format the active filter tags as chips
#[must_use]
pub fn filter_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        return "no filters".dimmed().to_string();
    }
    tags.iter()
        .map(|t| format!("[{t}]").yellow().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// One-line pager summary
#[must_use]
pub fn page_summary(state: &GridState) -> String {
    format!(
        "page {}/{}, {} row(s) total",
        state.current_page,
        state.page_count(),
        state.total
    )
}

/// Format a column for the column listing
#[must_use]
pub fn column_line(column: &ColumnSpec, quiet: bool) -> String {
    if quiet {
        return column.field.clone();
    }
    let status = if column.hidden {
        "hidden".red()
    } else {
        "shown".green()
    };
    let mut line = format!("  {:<16} {:<12} {status}", column.field, header(column));
    if column.sortable {
        line.push_str(" sortable");
    }
    if let Some(options) = &column.filter_options {
        let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
        line.push_str(&format!(" filter: {}", values.join("|")));
    }
    line
}
