//! Configuration module for assetgrid
//!
//! Manages grid defaults, the column layout store location and view overrides.
//! Configuration is stored in the user's config directory.

use crate::columns::{ColumnSpec, ViewDefinition, views};
use crate::grid::{Density, RemoteGridController, StalePolicy};
use crate::query::{DEFAULT_PAGE_SIZE, Query};
use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_page_size_options() -> Vec<u32> {
    vec![10, 20, 50, 100]
}

/// Per-view override of a built-in view, or a new view
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ViewConfig {
    /// Backend collection; defaults to the built-in one, or the view id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<Density>,

    /// Replaces the built-in columns when non-empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnSpec>,
}

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GridConfig {
    /// Rows per page of a freshly opened view
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Page sizes offered by the pager
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<u32>,

    /// Density forced on every view; each view's own density otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<Density>,

    #[serde(default)]
    pub stale_policy: StalePolicy,

    /// Column layout database; `<data_dir>/assetgrid/columns.db` if unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub views: HashMap<String, ViewConfig>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            page_size_options: default_page_size_options(),
            density: None,
            stale_policy: StalePolicy::default(),
            store_path: None,
            views: HashMap::new(),
        }
    }
}

impl GridConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;

        Ok(config_dir.join("assetgrid").join("config.toml"))
    }

    /// Load configuration from file, creating default if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, creating default if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let default_config = Self::default();
            default_config.save_to(path)?;
            return Ok(default_config);
        }

        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .build()?;

        settings.try_deserialize()
    }

    /// Save configuration to file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// Same as [`GridConfig::save`].
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Resolved column layout database path
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no path is configured and the system data
    /// directory cannot be determined.
    pub fn store_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.store_path {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine data directory".to_string()))?;
        Ok(data_dir.join("assetgrid").join("columns.db"))
    }

    /// Resolve a view: built-in preset with this file's overrides applied
    ///
    /// Views only present in the file need a non-empty column list.
    #[must_use]
    pub fn view(&self, id: &str) -> Option<ViewDefinition> {
        let overrides = self.views.get(id);
        let mut view = match (views::builtin(id), overrides) {
            (Some(view), _) => view,
            (None, Some(custom)) if !custom.columns.is_empty() => {
                ViewDefinition::new(id, id, Vec::new())
            }
            _ => return None,
        };

        if let Some(custom) = overrides {
            if let Some(collection) = &custom.collection {
                view.collection.clone_from(collection);
            }
            if let Some(density) = custom.density {
                view.density = density;
            }
            if !custom.columns.is_empty() {
                view.columns.clone_from(&custom.columns);
            }
        }
        if let Some(density) = self.density {
            view.density = density;
        }
        Some(view)
    }

    /// Identifiers of every resolvable view, sorted
    #[must_use]
    pub fn view_ids(&self) -> Vec<String> {
        let configured = self
            .views
            .iter()
            .filter(|(_, custom)| !custom.columns.is_empty())
            .map(|(id, _)| id.as_str());

        views::BUILTIN_VIEWS
            .into_iter()
            .chain(configured)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Empty query with the configured page size
    #[must_use]
    pub fn query(&self) -> Query {
        Query::with_page_size(self.default_page_size)
    }

    /// Controller for `view` starting from `query`, with the configured stale policy
    #[must_use]
    pub fn controller(&self, view: &ViewDefinition, query: Query) -> RemoteGridController {
        RemoteGridController::new(query)
            .with_policy(self.stale_policy)
            .with_density(view.density)
    }
}
