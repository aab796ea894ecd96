//! countup.toml handling

use anyhow::{Context, Result};
use blinc_countup::{CountUpOptions, RawValue};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Contents of a countup.toml file
#[derive(Debug, Default, Deserialize)]
pub struct CountUpFile {
    /// Value to count toward
    #[serde(default)]
    pub end_value: Option<RawValue>,
    /// Overrides applied before any command-line flags
    #[serde(default)]
    pub options: CountUpOptions,
}

impl CountUpFile {
    /// Load a configuration file, or countup.toml inside a directory
    pub fn load(path: &Path) -> Result<Self> {
        let config_path = if path.is_dir() {
            path.join("countup.toml")
        } else {
            path.to_path_buf()
        };

        if !config_path.exists() {
            anyhow::bail!("No countup config found at {}", config_path.display());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
