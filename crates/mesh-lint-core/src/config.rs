//! Configuration types for mesh-lint.

use crate::diag::{CatalogError, Level, MessageCatalog};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Top-level configuration for mesh-lint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Lowest level to report (default: `Info`).
    #[serde(default)]
    pub output_threshold: Option<Level>,

    /// Tag appended to documentation links as `?ref=<tag>`.
    #[serde(default)]
    pub doc_ref: Option<String>,

    /// Run-wide settings.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Per-analyzer settings, keyed by analyzer name.
    #[serde(default)]
    pub analyzers: BTreeMap<String, AnalyzerSettings>,

    /// Per-message settings, keyed by message name.
    #[serde(default)]
    pub messages: BTreeMap<String, MessageSettings>,

    /// Message catalog settings.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if an analyzer is enabled.
    #[must_use]
    pub fn is_analyzer_enabled(&self, name: &str) -> bool {
        self.analyzers
            .get(name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Returns the output threshold, defaulting to `Info`.
    #[must_use]
    pub fn threshold(&self) -> Level {
        self.output_threshold.unwrap_or(Level::Info)
    }

    /// Returns the configured level overrides.
    #[must_use]
    pub fn message_levels(&self) -> BTreeMap<String, Level> {
        self.messages
            .iter()
            .filter_map(|(name, settings)| settings.level.map(|l| (name.clone(), l)))
            .collect()
    }

    /// Builds the message catalog with the configured overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an override names an unknown message.
    pub fn build_catalog(&self) -> Result<MessageCatalog, CatalogError> {
        MessageCatalog::with_settings(self.catalog.doc_prefix.as_deref(), &self.message_levels())
    }
}

/// Run-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Namespace assigned to resources that do not declare one.
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    /// Glob patterns excluded when discovering input files.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files during discovery.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Number of analyzers to run in parallel.
    #[serde(default)]
    pub parallelism: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            default_namespace: default_namespace(),
            exclude: Vec::new(),
            respect_gitignore: true,
            parallelism: None,
        }
    }
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

/// Per-analyzer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerSettings {
    /// Whether this analyzer runs.
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Per-message configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageSettings {
    /// Level override for this message kind.
    #[serde(default)]
    pub level: Option<Level>,
}

/// Message catalog configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Documentation URL prefix.
    #[serde(default)]
    pub doc_prefix: Option<String>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}
