pub mod schema;

use crate::models::Config;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde_yaml_ng::Value;
use std::fs;

/// Loads the card configuration from a YAML file.
///
/// Reading and parsing failures carry the file path as context; everything
/// past parsing is checked by [`Config::import`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    pub fn new<P: AsRef<Utf8Path>>(config_path: P) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    /// Read the file into a raw YAML tree without interpreting it
    pub fn read_config_file(&self) -> Result<Value> {
        let file_contents = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read card config: {}", self.config_path))?;

        let value: Value = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse card config: {}", self.config_path))?;

        Ok(value)
    }

    /// Read, validate and import the configuration
    pub fn load(&self) -> Result<Config> {
        let raw = self.read_config_file()?;
        let config = Config::import(&raw)
            .with_context(|| format!("Invalid card config: {}", self.config_path))?;

        tracing::info!(
            "Loaded {} cards from {}",
            config.cards.len(),
            self.config_path
        );
        if tracing::enabled!(tracing::Level::DEBUG) {
            match serde_yaml_ng::to_string(&config) {
                Ok(dump) => tracing::debug!("Imported configuration:\n{}", dump),
                Err(e) => tracing::debug!("Could not dump imported configuration: {}", e),
            }
        }

        Ok(config)
    }
}
