//! Configuration management for codekg.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `codekg.toml` file
//! 3. User config `~/.config/codekg/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

mod defaults;

pub use defaults::*;

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
    /// Extraction engine configuration.
    pub extraction: ExtractionConfig,

    /// Repository indexing configuration.
    pub indexer: IndexerConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./codekg.toml` (project local)
    /// 2. `~/.config/codekg/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(CONFIG_FILE_NAME).exists() {
            return Self::from_file(CONFIG_FILE_NAME);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(USER_CONFIG_DIR).join("config.toml");
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

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(grammar) = std::env::var("CODEKG_GRAMMAR") {
            self.extraction.grammar = grammar;
        }
        if let Ok(size) = std::env::var("CODEKG_MAX_FILE_SIZE") {
            if let Ok(n) = size.parse() {
                self.indexer.max_file_size = n;
            }
        }
        if let Ok(workers) = std::env::var("CODEKG_MAX_CONCURRENCY") {
            if let Ok(n) = workers.parse() {
                self.indexer.max_concurrency = n;
            }
        }
        if let Ok(timeout) = std::env::var("CODEKG_PARSE_TIMEOUT_MS") {
            if let Ok(n) = timeout.parse() {
                self.indexer.parse_timeout_ms = n;
            }
        }
    }

    /// Reject settings the indexer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extraction.grammar.trim().is_empty() {
            return Err(ConfigError::Invalid("extraction.grammar is empty".into()));
        }
        if self.indexer.max_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "indexer.max_concurrency must be at least 1".into(),
            ));
        }
        if self.indexer.parse_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "indexer.parse_timeout_ms must be positive".into(),
            ));
        }
        if self.indexer.include_extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "indexer.include_extensions is empty".into(),
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

/// Extraction engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Grammar selector: a language name or file extension.
    pub grammar: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            grammar: DEFAULT_GRAMMAR.to_string(),
        }
    }
}

/// Repository indexing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// File extensions to index (without leading dot).
    pub include_extensions: Vec<String>,

    /// Directory names to skip anywhere in the tree.
    pub exclude_dirs: Vec<String>,

    /// Glob patterns matched against the path relative to the indexed root.
    pub exclude_patterns: Vec<String>,

    /// Files larger than this (in bytes) are skipped.
    pub max_file_size: u64,

    /// Maximum number of files parsed concurrently.
    pub max_concurrency: usize,

    /// Per-file parse deadline in milliseconds.
    pub parse_timeout_ms: u64,

    /// Honour `.gitignore` files while walking.
    pub respect_gitignore: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            include_extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            exclude_patterns: DEFAULT_EXCLUDE_PATTERNS.iter().map(|s| s.to_string()).collect(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            parse_timeout_ms: DEFAULT_PARSE_TIMEOUT_MS,
            respect_gitignore: true,
        }
    }
}

impl IndexerConfig {
    /// Parse deadline as a `Duration`.
    pub fn parse_timeout(&self) -> Duration {
        Duration::from_millis(self.parse_timeout_ms)
    }
}
