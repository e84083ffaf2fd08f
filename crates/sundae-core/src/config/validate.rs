//! Configuration validation.

use crate::error::ConfigError;
use crate::presenter::OutputFormat;

use super::Config;

impl Config {
    /// Validate configuration values are usable.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.model.preferred.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "model.preferred must not be empty".into(),
            ));
        }
        if self.model.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "model.endpoint must not be empty".into(),
            ));
        }
        if self.credentials.env_vars.iter().all(|v| v.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "credentials.env_vars must name at least one variable".into(),
            ));
        }
        if self.input.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "input.supported_formats must not be empty".into(),
            ));
        }
        if self.input.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "input.max_file_size_mb must be > 0".into(),
            ));
        }
        if OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output.format must be text, sections or json (got '{}')",
                self.output.format
            )));
        }
        Ok(())
    }
}
