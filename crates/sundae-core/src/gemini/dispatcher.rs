//! Sends exactly one analysis request to a resolved model.

use super::service::ModelService;
use crate::error::AnalysisError;
use crate::types::{AnalysisRequest, AnalysisResult, ResolvedModel};
use std::time::Instant;

/// Dispatches analysis requests. No automatic retry happens here.
pub struct Dispatcher<'a> {
    service: &'a dyn ModelService,
}

impl<'a> Dispatcher<'a> {
    pub fn new(service: &'a dyn ModelService) -> Self {
        Self { service }
    }

    /// Send the request and wait for the full reply.
    ///
    /// An empty image fails with `InputInvalid` before anything goes out.
    pub async fn dispatch(
        &self,
        model: &ResolvedModel,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, AnalysisError> {
        let image = request.image();
        if image.is_empty() {
            return Err(AnalysisError::InputInvalid {
                message: format!("{} is empty", image.name()),
            });
        }

        tracing::info!(
            "Sending {} ({} bytes, {}) to {}",
            image.name(),
            image.len(),
            image.format().mime_type(),
            model.model_used()
        );
        let start = Instant::now();

        let text = self
            .service
            .generate(&model.handle, request)
            .await
            .map_err(|source| AnalysisError::RequestFailed {
                model: model.model_used().to_string(),
                source,
            })?;

        let latency_ms = start.elapsed().as_millis() as u64;
        tracing::debug!("Received {} chars in {latency_ms}ms", text.len());

        Ok(AnalysisResult {
            text,
            model: model.model_used().to_string(),
            image_name: image.name().to_string(),
            latency_ms,
        })
    }
}
