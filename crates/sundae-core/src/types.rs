//! Core data types flowing through an analysis request.

use serde::Serialize;

use crate::error::ModelAttempt;
use crate::image::ImagePayload;

/// A successfully constructed reference to one remote model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHandle {
    /// Identifier the handle was constructed with (e.g. "gemini-2.5-flash")
    pub name: String,

    /// Human-readable name reported by the service, if any
    pub display_name: Option<String>,
}

impl ModelHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
        }
    }
}

/// Outcome of model resolution.
#[derive(Debug, Clone)]
pub struct ResolvedModel {
    /// Handle to the first candidate that accepted construction
    pub handle: ModelHandle,

    /// Candidates that failed before it, in attempt order
    pub skipped: Vec<ModelAttempt>,
}

impl ResolvedModel {
    /// Name of the model that will serve requests.
    pub fn model_used(&self) -> &str {
        &self.handle.name
    }

    /// Whether a fallback (not the preferred name) was used.
    pub fn used_fallback(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// One image plus the instruction that steers the model. Immutable once built.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    image: ImagePayload,
    instruction: String,
}

impl AnalysisRequest {
    pub fn new(image: ImagePayload, instruction: impl Into<String>) -> Self {
        Self {
            image,
            instruction: instruction.into(),
        }
    }

    pub fn image(&self) -> &ImagePayload {
        &self.image
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }
}

/// Raw text returned by the model, with the context needed to present it.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    /// Response text, unmodified
    pub text: String,

    /// Model that produced it
    pub model: String,

    /// Name of the analysed image
    pub image_name: String,

    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}
