//! The seam between the resolver/dispatcher and the remote model service.

use crate::error::ApiError;
use crate::types::{AnalysisRequest, ModelHandle};
use async_trait::async_trait;

/// Operations the pipeline needs from a remote multimodal model service.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the analyst holds a `Box<dyn ModelService>`).
#[async_trait]
pub trait ModelService: Send + Sync {
    /// Service name for logging.
    fn name(&self) -> &str;

    /// Construct a handle to the named model, failing if it is unknown,
    /// unsupported, or the credential is rejected.
    async fn load_model(&self, model: &str) -> Result<ModelHandle, ApiError>;

    /// Send one image + instruction and return the reply text unmodified.
    async fn generate(
        &self,
        model: &ModelHandle,
        request: &AnalysisRequest,
    ) -> Result<String, ApiError>;
}
