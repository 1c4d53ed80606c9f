//! Runtime configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the database backing the durable storage area
    pub database_path: PathBuf,
    /// Origin that extension page paths are resolved against
    pub extension_origin: String,
    /// Intermediate page the search redirect rule points at
    pub resolve_page_path: String,
    /// Options page, offered when resolution fails
    pub options_page_path: String,
    /// Fixed id of the search redirect rule
    pub redirect_rule_id: u32,
    /// Omnibox suggestion limit
    pub max_suggestions: usize,
    /// Length of the first-target preview in suggestions
    pub preview_chars: usize,
    /// Seed example aliases on install when the store is empty
    pub seed_default_aliases: bool,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("linkas.db"),
            extension_origin: "chrome-extension://linkas".to_string(),
            resolve_page_path: "/pages/resolve/index.html".to_string(),
            options_page_path: "/options/index.html".to_string(),
            redirect_rule_id: 1001,
            max_suggestions: 8,
            preview_chars: 60,
            seed_default_aliases: true,
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Linkas"))
            .unwrap_or_else(|| PathBuf::from(".linkas"))
    }

    /// Read a TOML config file. A missing file yields the defaults; fields
    /// absent from the file keep their default values.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)?;
        let config = toml::from_str(&text)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?;

        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}
