//! Session configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// The file is not valid configuration JSON
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },
}

/// Settings for one shell session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Sandbox root, created if missing
    pub root: PathBuf,
    /// Name shown before the directory label in the prompt
    pub prompt_name: String,
    /// Delete the sandbox root when the session ends
    pub cleanup_on_exit: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./workspace"),
            prompt_name: "futur".to_string(),
            cleanup_on_exit: false,
        }
    }
}

impl SessionConfig {
    /// Parse configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
