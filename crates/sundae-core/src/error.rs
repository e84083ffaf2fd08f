//! Error types for SUNDAE chart analysis.
//!
//! `AnalysisError` is the taxonomy every request can end in. All variants are
//! terminal for the request in flight; the only automatic recovery is the
//! model-name fallback performed by the resolver before a request is sent.

use thiserror::Error;

/// Top-level error type for SUNDAE operations.
#[derive(Error, Debug)]
pub enum SundaeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A failed analysis request
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Why a single analysis request could not complete.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// No credential source yielded a value
    #[error("Gemini API key not found (checked: {})", .searched.join(", "))]
    CredentialMissing { searched: Vec<String> },

    /// Every candidate model name failed construction
    #[error("No usable Gemini model: {}", format_attempts(.attempts))]
    ModelUnavailable { attempts: Vec<ModelAttempt> },

    /// The outbound generate call errored or timed out
    #[error("Request to {model} failed: {source}")]
    RequestFailed {
        model: String,
        #[source]
        source: ApiError,
    },

    /// Empty or unsupported image payload
    #[error("Invalid input image: {message}")]
    InputInvalid { message: String },
}

impl AnalysisError {
    /// Things the user can do about this failure, most specific first.
    pub fn remedies(&self) -> Vec<String> {
        match self {
            AnalysisError::CredentialMissing { searched } => searched
                .iter()
                .map(|location| format!("Provide the key via {location}"))
                .collect(),
            AnalysisError::ModelUnavailable { attempts } => {
                let mut remedies: Vec<String> = attempts
                    .iter()
                    .map(|a| format!("{}: {}", a.model, a.error.hint()))
                    .collect();
                remedies.push("Override the model list with --model / --fallback".to_string());
                remedies
            }
            AnalysisError::RequestFailed { source, .. } => vec![source.hint().to_string()],
            AnalysisError::InputInvalid { .. } => {
                vec!["Upload a non-empty PNG, JPEG, GIF, BMP or WebP chart image".to_string()]
            }
        }
    }
}

/// One failed attempt to construct a model handle.
#[derive(Debug, Clone)]
pub struct ModelAttempt {
    /// Model identifier that was tried
    pub model: String,
    /// Why construction failed
    pub error: ApiError,
}

fn format_attempts(attempts: &[ModelAttempt]) -> String {
    if attempts.is_empty() {
        return "no model names configured".to_string();
    }
    attempts
        .iter()
        .map(|a| format!("{} ({})", a.model, a.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// A failure reported by (or on the way to) the Gemini REST API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    /// Vendor or transport error detail
    pub message: String,
    /// HTTP status when the server answered
    pub status_code: Option<u16>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status_code,
        }
    }

    /// Map the failure to a user-facing remedy.
    ///
    /// Classified by HTTP status when available; transport failures without a
    /// status fall back to message inspection.
    pub fn hint(&self) -> &'static str {
        match self.status_code {
            Some(400) if self.message.contains("API key") => {
                "the API key was rejected; check the key value"
            }
            Some(400) => "the request was rejected as malformed",
            Some(401) | Some(403) => "the API key is not authorised for this model",
            Some(404) => "the model name is unknown or retired",
            Some(429) => "quota exhausted; wait or upgrade the plan",
            Some(code) if (500..=599).contains(&code) => "the service is failing; try again later",
            Some(_) => "unexpected response from the service",
            None if self.message.contains("timed out") => "the request timed out",
            None if self.message.contains("connect") => "could not reach the Gemini endpoint",
            None => "see the error detail",
        }
    }
}

/// Convenience type alias for SUNDAE results.
pub type Result<T> = std::result::Result<T, SundaeError>;
