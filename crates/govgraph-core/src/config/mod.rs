//! Configuration management for govgraph.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `govgraph.toml` file
//! 3. User config `~/.config/govgraph/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

mod defaults;

pub use defaults::*;

use crate::model::IdTemplate;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub store: StoreConfig,

    /// Identifier minting configuration.
    pub identity: IdentityConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./govgraph.toml` (project local)
    /// 2. `~/.config/govgraph/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(LOCAL_CONFIG_FILE).exists() {
            return Self::from_file(LOCAL_CONFIG_FILE);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE);
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply `GOVGRAPH_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Store overrides
        if let Some(engine) = var("GOVGRAPH_DB_ENGINE") {
            self.store.engine = engine;
        }
        if let Some(path) = var("GOVGRAPH_DB_PATH") {
            self.store.path = path;
        }
        if let Some(attempts) = var("GOVGRAPH_MAX_WRITE_ATTEMPTS") {
            if let Ok(n) = attempts.parse() {
                self.store.max_write_attempts = n;
            }
        }

        // Identity overrides
        if let Some(namespace) = var("GOVGRAPH_ID_NAMESPACE") {
            self.identity.id_namespace = namespace;
        }
        if let Some(attempts) = var("GOVGRAPH_MAX_MINT_ATTEMPTS") {
            if let Ok(n) = attempts.parse() {
                self.identity.max_mint_attempts = n;
            }
        }

        // Logging overrides
        if let Some(filter) = var("GOVGRAPH_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Reject settings the store cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_ENGINES.contains(&self.store.engine.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown store engine '{}' (expected one of: {})",
                self.store.engine,
                SUPPORTED_ENGINES.join(", ")
            )));
        }
        if self.store.max_write_attempts == 0 {
            return Err(ConfigError::Invalid(
                "store.max_write_attempts must be at least 1".to_string(),
            ));
        }
        if self.identity.max_mint_attempts == 0 {
            return Err(ConfigError::Invalid(
                "identity.max_mint_attempts must be at least 1".to_string(),
            ));
        }
        if self.identity.id_namespace.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "identity.id_namespace must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// "rocksdb" or "memory".
    pub engine: String,

    /// Database directory for the rocksdb engine.
    pub path: String,

    /// SurrealDB namespace.
    pub namespace: String,

    /// SurrealDB database.
    pub database: String,

    /// Attempts per node save when concurrent saves of one resource conflict.
    pub max_write_attempts: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            engine: DEFAULT_ENGINE.to_string(),
            path: DEFAULT_DB_PATH.to_string(),
            namespace: DEFAULT_DB_NAMESPACE.to_string(),
            database: DEFAULT_DB_DATABASE.to_string(),
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }
}

impl StoreConfig {
    /// In-memory store, used by tests and dry runs.
    pub fn memory() -> Self {
        Self {
            engine: "memory".to_string(),
            ..Self::default()
        }
    }

    /// On-disk store at `path`.
    pub fn rocksdb(path: impl Into<PathBuf>) -> Self {
        Self {
            engine: "rocksdb".to_string(),
            path: path.into().to_string_lossy().to_string(),
            ..Self::default()
        }
    }

    pub fn is_memory(&self) -> bool {
        self.engine == "memory"
    }

    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }
}

/// Identifier minting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Prefix of external identifiers.
    pub id_namespace: String,

    /// Lookup/mint rounds per resolve before a race is reported.
    pub max_mint_attempts: u32,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            id_namespace: DEFAULT_ID_NAMESPACE.to_string(),
            max_mint_attempts: DEFAULT_MAX_MINT_ATTEMPTS,
        }
    }
}

impl IdentityConfig {
    pub fn id_template(&self) -> IdTemplate {
        IdTemplate::new(self.id_namespace.clone())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
