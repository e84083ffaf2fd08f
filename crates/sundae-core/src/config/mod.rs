//! Configuration management for SUNDAE.
//!
//! Configuration is loaded from the platform config directory with defaults
//! for every field. The loaded value is handed explicitly to the resolver and
//! dispatcher; nothing reads it from global state.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for SUNDAE.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model selection and endpoint
    pub model: ModelConfig,

    /// Credential lookup locations
    pub credentials: CredentialConfig,

    /// Input image constraints
    pub input: InputConfig,

    /// Analysis instruction
    pub analysis: AnalysisConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.sundae.sundae/config.toml
    /// - Linux: ~/.config/sundae/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\sundae\sundae\config\config.toml
    ///
    /// Falls back to ~/.sundae/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "sundae", "sundae")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".sundae").join("config.toml")
            })
    }

    /// Resolved dotfile path (with ~ expansion).
    pub fn dotenv_path(&self) -> PathBuf {
        expand(&self.credentials.dotenv_file)
    }

    /// Resolved plaintext key file path (with ~ expansion).
    pub fn key_file_path(&self) -> PathBuf {
        expand(&self.credentials.key_file)
    }

    /// Advisory size ceiling in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.input.max_file_size_mb.saturating_mul(1024 * 1024)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
