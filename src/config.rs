//! Configuration file handling.
//!
//! This module provides loading and parsing of `.cypher_builder.json`
//! configuration files. Every field is optional; a missing file means defaults.
//!
//! ```json
//! {
//!   "render": {
//!     "max_depth": 64,
//!     "interpolate": false
//!   }
//! }
//! ```

use log::debug;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use crate::builder::classify::DEFAULT_MAX_DEPTH;

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = ".cypher_builder.json";

/// Top-level configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Rendering options
    #[serde(default)]
    pub render: RenderConfig,
}

/// Options applied when rendering condition documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Maximum nesting depth accepted for condition documents
    pub max_depth: usize,
    /// Also show the script with parameters substituted as literals
    pub interpolate: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            interpolate: false,
        }
    }
}

impl ConfigFile {
    /// Load configuration from `.cypher_builder.json` in the current directory.
    pub fn load() -> Result<Self, Box<dyn Error>> {
        Self::load_from(&PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Load configuration from a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The JSON is invalid
    /// - `render.max_depth` is zero
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn Error>> {
        if !path.exists() {
            debug!("no config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to read {}: {}", path.display(), e),
            )) as Box<dyn Error>
        })?;

        let config: ConfigFile = serde_json::from_str(&content).map_err(|e| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Invalid JSON in {}: {}", path.display(), e),
            )) as Box<dyn Error>
        })?;

        if config.render.max_depth == 0 {
            return Err(format!("{}: render.max_depth must be at least 1", path.display()).into());
        }

        debug!("loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }
}
