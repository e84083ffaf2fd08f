//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Default Gemini REST endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Remote model selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model tried first
    pub preferred: String,

    /// Models tried in order when the preferred one cannot be loaded
    pub fallbacks: Vec<String>,

    /// Base URL of the Gemini REST API
    pub endpoint: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            preferred: "gemini-2.5-flash".to_string(),
            fallbacks: vec![
                "gemini-2.0-flash-exp".to_string(),
                "gemini-1.5-flash".to_string(),
            ],
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl ModelConfig {
    /// Candidate names in attempt order: preferred first, then fallbacks.
    ///
    /// Blank entries are dropped and a name appearing twice is only tried once.
    pub fn candidates(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.fallbacks.len() + 1);
        for name in std::iter::once(&self.preferred).chain(self.fallbacks.iter()) {
            let name = name.trim();
            if !name.is_empty() && !out.iter().any(|n| n == name) {
                out.push(name.to_string());
            }
        }
        out
    }
}

/// Where the API key is looked up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    /// Environment variables checked in order
    pub env_vars: Vec<String>,

    /// Dotfile holding `NAME=value` entries for the same variable names
    pub dotenv_file: String,

    /// Plaintext file containing only the key
    pub key_file: String,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            env_vars: vec!["GEMINI_API_KEY".to_string(), "GOOGLE_API_KEY".to_string()],
            dotenv_file: ".env".to_string(),
            key_file: "config/gemini_api_key.txt".to_string(),
        }
    }
}

/// Input image constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Accepted file extensions
    pub supported_formats: Vec<String>,

    /// Size above which a warning is shown (not a rejection)
    pub max_file_size_mb: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            supported_formats: ["png", "jpg", "jpeg", "gif", "bmp", "webp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_file_size_mb: 10,
        }
    }
}

/// Analysis instruction settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Custom instruction sent with every image. Empty uses the built-in persona.
    pub instruction: String,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default render format ("text", "sections" or "json")
    pub format: String,

    /// Frame text output with a header naming the model
    pub banner: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            banner: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
