//! # Configuration Utilities
//!
//! Optional TOML configuration for the command-line tool. Every section has
//! defaults, so an empty file (or no file at all) is a valid configuration.

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::processing::EmbedMode;

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Arguments
/// - `path`: Path to the TOML configuration file
///
/// # Returns
/// - `Ok(T)`: Successfully loaded and parsed configuration
/// - `Err`: File I/O or parsing error
///
/// # Example
/// ```ignore
/// let config: AppConfig = load_config("config/steganohuff.toml")?;
/// ```
pub fn load_config<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: T = toml::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(config)
}

/// Complete tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub embedding: EmbeddingConfig,
    pub logging: LoggingConfig,
}

/// Which channel ordering to embed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    Sequential,
    Shuffled,
}

/// Embedding defaults, overridable from the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub mode: ModeKind,
    /// Shuffle seed, only read when `mode = "shuffled"`
    pub seed: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            mode: ModeKind::Sequential,
            seed: 0,
        }
    }
}

impl EmbeddingConfig {
    pub fn embed_mode(&self) -> EmbedMode {
        match self.mode {
            ModeKind::Sequential => EmbedMode::Sequential,
            ModeKind::Shuffled => EmbedMode::Shuffled { seed: self.seed },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `error`, `warn`, `info`, `debug`, `trace`, `off`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Parsed level; unknown names fall back to `Info`.
    pub fn level_filter(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::Info)
    }
}
