//! Configuration management for healthdir.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "healthdir";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "documents.db";

/// Default rendered page file name.
const PAGE_FILE_NAME: &str = "unidades.html";

/// Collection holding the facility documents.
pub const DEFAULT_COLLECTION: &str = "unidades_saude";

/// Allowed shape of a collection name.
const COLLECTION_PATTERN: &str = r"^[A-Za-z0-9_\-]+$";

/// Upper bound on the Firestore list page size.
const MAX_PAGE_SIZE: u32 = 1000;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `HEALTHDIR_`, nested with `__`)
/// 2. TOML config file at `~/.config/healthdir/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where facility documents come from.
    pub source: SourceConfig,
    /// Firestore connection settings.
    pub firestore: FirestoreConfig,
    /// Search input behavior.
    pub search: SearchConfig,
    /// Display surface settings.
    pub display: DisplayConfig,
}

/// Which document store backs the directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Local `SQLite` document table.
    #[default]
    Sqlite,
    /// Cloud Firestore over its REST API.
    Firestore,
    /// A JSON file keyed by collection.
    Json,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::Firestore => write!(f, "firestore"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Document source configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Store implementation to read from.
    pub kind: SourceKind,
    /// Name of the collection holding facility documents.
    pub collection: String,
    /// Path to the `SQLite` database.
    /// Defaults to `~/.local/share/healthdir/documents.db`
    pub database_path: Option<PathBuf>,
    /// Path to the JSON document file (required for the `json` kind).
    pub json_path: Option<PathBuf>,
}

/// Firestore REST configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirestoreConfig {
    /// Google Cloud project id (required for the `firestore` kind).
    pub project_id: Option<String>,
    /// Database id inside the project.
    pub database: String,
    /// REST endpoint root.
    pub base_url: String,
    /// Web API key appended to each request, if set.
    pub api_key: Option<String>,
    /// Documents requested per page.
    pub page_size: u32,
    /// Request timeout in seconds. Unset means wait indefinitely.
    pub timeout_secs: Option<u64>,
}

/// Search input configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Delay before a burst of input is filtered, in milliseconds.
    /// Set to 0 to filter on every input event.
    pub debounce_ms: u64,
}

/// Display surface configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Where the rendered page is written.
    /// Defaults to `~/.local/share/healthdir/unidades.html`
    pub output_path: Option<PathBuf>,
    /// Title of the rendered page.
    pub title: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            collection: DEFAULT_COLLECTION.to_string(),
            database_path: None,
            json_path: None,
        }
    }
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            database: "(default)".to_string(),
            base_url: "https://firestore.googleapis.com/v1".to_string(),
            api_key: None,
            page_size: 300,
            timeout_secs: None,
        }
    }
}

impl FirestoreConfig {
    /// Get the request timeout, if any.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            output_path: None,
            title: "Unidades de Saúde".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("HEALTHDIR_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        validate_collection_name(&self.source.collection)?;

        match self.source.kind {
            SourceKind::Firestore => {
                if self
                    .firestore
                    .project_id
                    .as_deref()
                    .map_or(true, str::is_empty)
                {
                    return Err(Error::config_validation(
                        "firestore.project_id is required when source.kind is \"firestore\"",
                    ));
                }
            }
            SourceKind::Json => {
                if self.source.json_path.is_none() {
                    return Err(Error::config_validation(
                        "source.json_path is required when source.kind is \"json\"",
                    ));
                }
            }
            SourceKind::Sqlite => {}
        }

        if self.firestore.page_size == 0 || self.firestore.page_size > MAX_PAGE_SIZE {
            return Err(Error::config_validation(format!(
                "firestore.page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.firestore.page_size
            )));
        }

        if self.firestore.timeout_secs == Some(0) {
            return Err(Error::config_validation(
                "firestore.timeout_secs must be greater than 0 when set",
            ));
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.source
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the rendered page path, resolving defaults if not set.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.display
            .output_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(PAGE_FILE_NAME))
    }

    /// Get the search debounce delay, if enabled.
    #[must_use]
    pub fn debounce(&self) -> Option<Duration> {
        if self.search.debounce_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.search.debounce_ms))
        }
    }
}

/// Check that a collection name is safe to use in store paths and queries.
///
/// # Errors
///
/// Returns a validation error when the name is empty or contains characters
/// outside `[A-Za-z0-9_-]`.
pub fn validate_collection_name(name: &str) -> Result<()> {
    let pattern = Regex::new(COLLECTION_PATTERN)
        .map_err(|e| Error::internal(format!("collection pattern: {e}")))?;
    if pattern.is_match(name) {
        Ok(())
    } else {
        Err(Error::config_validation(format!(
            "invalid collection name: {name:?}"
        )))
    }
}
