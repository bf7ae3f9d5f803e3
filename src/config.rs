//! TOML configuration parsing.
//!
//! Every section and field has a default, so a missing or partial file still
//! yields a usable [`Config`]. The model endpoint defaults to a local Ollama
//! instance on `http://localhost:11434`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Model used when none is given on the command line. When unset, the
    /// first model reported by the endpoint is selected.
    #[serde(default)]
    pub default_model: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout_secs(),
            default_model: None,
        }
    }
}

fn default_url() -> String {
    crate::client::DEFAULT_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExtractConfig {
    /// Rows rendered in each sheet's "Sample Data" block.
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            sample_rows: default_sample_rows(),
        }
    }
}

fn default_sample_rows() -> usize {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
        }
    }
}

fn default_max_bytes() -> u64 {
    200 * 1024 * 1024
}

/// Parse and validate a configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.model.url.trim().is_empty() {
        anyhow::bail!("model.url must not be empty");
    }
    if config.model.timeout_secs == 0 {
        anyhow::bail!("model.timeout_secs must be > 0");
    }
    if config.extract.sample_rows == 0 {
        anyhow::bail!("extract.sample_rows must be > 0");
    }
    if config.upload.max_bytes == 0 {
        anyhow::bail!("upload.max_bytes must be > 0");
    }

    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Load `path` if it exists, otherwise fall back to built-in defaults.
///
/// Used for the default config location only; an explicitly requested file
/// that does not exist goes through [`load_config`] and fails.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::default())
    }
}
