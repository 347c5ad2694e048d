//! Assetgrid CLI application entry point
//!
//! A headless front end of the asset grid. It prints backend search requests,
//! pages through local JSON data sets and edits the persisted column layout of
//! each view.
//!
//! # Usage
//!
//! ```bash
//! # Backend request for the URL view, status 404 or 500, sorted by length
//! assetgrid request -v url -f statuscode=404 -f statuscode=500 --sort length
//!
//! # Render page 2 of a local data set with the visible columns of the asset view
//! assetgrid fetch -s assets.json -p 2
//!
//! # Hide a column of the asset view
//! assetgrid columns hide title
//!
//! # Check a keyword expression
//! assetgrid keyword 'title="admin" || statuscode=="403"'
//! ```
//!
//! # Configuration
//!
//! Configuration is stored in the user's config directory
//! (`~/.config/assetgrid/config.toml` on Linux) and created on first run.
//! Log verbosity is read from `ASSETGRID_LOG` (default `warn`).

use assetgrid::{
    GridError,
    cli::{Cli, ColumnCommands, Commands, QueryArgs},
    columns::{ColumnRegistry, SledStore, ViewDefinition},
    config::GridConfig,
    grid::MemorySource,
    output::{self, OutputFormat},
    query::{FetchRequest, KeywordExpr, Query},
};
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::path::Path;
use tracing::warn;
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, GridError>;

fn init_logging() {
    let filter = EnvFilter::try_from_env("ASSETGRID_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<GridConfig> {
    Ok(match path {
        Some(path) => GridConfig::load_from(path)?,
        None => GridConfig::load()?,
    })
}

fn resolve_view(config: &GridConfig, id: &str) -> Result<ViewDefinition> {
    config.view(id).ok_or_else(|| {
        GridError::InvalidInput(format!(
            "unknown view '{id}' (known: {})",
            config.view_ids().join(", ")
        ))
    })
}

fn open_registry(config: &GridConfig, view: &ViewDefinition) -> Result<ColumnRegistry<SledStore>> {
    let path = config.store_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let store = SledStore::open(&path)?;
    Ok(ColumnRegistry::for_view(view, store)?)
}

fn build_query(config: &GridConfig, args: &QueryArgs) -> Result<Query> {
    let query = args.to_query(config.query())?;
    if let Err(e) = KeywordExpr::parse(&query.keyword) {
        warn!(keyword = %query.keyword, error = %e, "keyword does not parse, sending it unchanged");
    }
    Ok(query)
}

fn handle_request(config: &GridConfig, view: &str, args: &QueryArgs) -> Result<()> {
    let view = resolve_view(config, view)?;
    let query = build_query(config, args)?;
    let request = FetchRequest::from(&query).to_search_request(&view.collection);
    println!("{}", request.to_json()?);
    Ok(())
}

fn handle_fetch(
    config: &GridConfig,
    source: &Path,
    view: &str,
    args: &QueryArgs,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let view = resolve_view(config, view)?;
    let registry = open_registry(config, &view)?;
    let data = MemorySource::from_json(&fs::read_to_string(source)?)?;

    let mut grid = config.controller(&view, build_query(config, args)?);
    futures::executor::block_on(grid.fetch_page(&data))?;

    let columns: Vec<_> = registry.visible_columns().filter(|c| !c.is_select()).collect();
    println!("{}", output::render(&grid.state().rows, &columns, format)?);

    if !quiet && format == OutputFormat::Table {
        println!();
        println!("{}", output::filter_tags(&grid.filters().to_active_filter_tags()));
        println!("{}", output::page_summary(grid.state()).dimmed());
    }
    Ok(())
}

fn handle_columns(config: &GridConfig, command: &ColumnCommands, quiet: bool) -> Result<()> {
    match command {
        ColumnCommands::List { view } => {
            let view = resolve_view(config, view)?;
            let registry = open_registry(config, &view)?;
            if !quiet {
                println!("Columns of view '{}' ({}):", view.id.bold(), view.collection);
            }
            for column in registry.columns().iter().filter(|c| !c.is_select()) {
                println!("{}", output::column_line(column, quiet));
            }
            if !quiet {
                let statistics = if registry.statistics_hidden() { "hidden" } else { "shown" };
                println!("Statistics panel: {statistics}");
            }
        }
        ColumnCommands::Hide { view, fields } | ColumnCommands::Show { view, fields } => {
            let hidden = matches!(command, ColumnCommands::Hide { .. });
            let view = resolve_view(config, view)?;
            let mut registry = open_registry(config, &view)?;
            for field in fields {
                if registry.set_hidden(field, hidden)? {
                    if !quiet {
                        let verb = if hidden { "Hidden" } else { "Shown" };
                        println!("{} {}", verb.green(), field);
                    }
                } else {
                    eprintln!("{} no column '{}' in view '{}'", "Warning:".yellow(), field, view.id);
                }
            }
        }
        ColumnCommands::Statistics { view, visibility } => {
            let view = resolve_view(config, view)?;
            let mut registry = open_registry(config, &view)?;
            registry.set_statistics_hidden(visibility.hidden())?;
            if !quiet {
                println!("Statistics panel {}", if visibility.hidden() { "hidden" } else { "shown" });
            }
        }
    }
    Ok(())
}

fn handle_keyword(expression: &str, quiet: bool) -> Result<()> {
    match KeywordExpr::parse(expression)? {
        Some(expr) => {
            println!("{expr}");
            if !quiet {
                println!("{} {}", "fields:".dimmed(), expr.fields().join(", "));
            }
        }
        None => {
            if !quiet {
                println!("{}", "empty expression, matches everything".dimmed());
            }
        }
    }
    Ok(())
}

fn handle_views(config: &GridConfig, quiet: bool) {
    for id in config.view_ids() {
        match config.view(&id) {
            Some(view) if !quiet => println!("  {:<16} {}", view.id, view.collection.dimmed()),
            _ => println!("{id}"),
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let quiet = cli.quiet;

    match &cli.command {
        Commands::Request { view, query } => handle_request(&config, view, query),
        Commands::Fetch {
            source,
            view,
            query,
            format,
        } => handle_fetch(&config, source, view, query, *format, quiet),
        Commands::Columns { command } => handle_columns(&config, command, quiet),
        Commands::Keyword { expression } => handle_keyword(expression, quiet),
        Commands::Views => {
            handle_views(&config, quiet);
            Ok(())
        }
    }
}

fn main() {
    init_logging();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("{} {e}", "Error:".red());
        std::process::exit(1);
    }
}
