//! SUNDAE Core - crypto futures chart analysis through Gemini.
//!
//! Takes a chart image, sends it with a fixed analyst instruction to a
//! Gemini model and returns the reply text for display.
//!
//! # Architecture
//!
//! ```text
//! Credential → Image validation → Model resolution (fallback list) → Dispatch → Presenter
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use sundae_core::{Analyst, Config, ImagePayload};
//!
//! #[tokio::main]
//! async fn main() -> sundae_core::Result<()> {
//!     let config = Config::load()?;
//!     let analyst = Analyst::from_config(config, None)?;
//!
//!     let image = ImagePayload::from_path("btc_4h.png".as_ref(), &analyst.config().input)?;
//!     let result = analyst.analyze(&image).await?;
//!     println!("{}", result.text);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod credential;
pub mod error;
pub mod gemini;
pub mod image;
pub mod presenter;
pub mod prompt;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use credential::{Credential, CredentialSource};
pub use error::{AnalysisError, ApiError, ConfigError, ModelAttempt, Result, SundaeError};
pub use gemini::{Dispatcher, GeminiClient, ModelResolver, ModelService};
pub use image::{ImageFormat, ImagePayload, SizeAdvisory};
pub use presenter::{OutputFormat, Presenter};
pub use types::{AnalysisRequest, AnalysisResult, ModelHandle, ResolvedModel};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The analysis pipeline: resolves a model and dispatches chart images to it.
pub struct Analyst {
    config: Config,
    service: Box<dyn ModelService>,
}

impl Analyst {
    /// Build an analyst talking to the configured Gemini endpoint.
    ///
    /// Fails with `CredentialMissing` before any model is contacted.
    pub fn from_config(config: Config, explicit_key: Option<&str>) -> Result<Self> {
        let credential = credential::resolve(&config, explicit_key)?;
        tracing::debug!("API key source: {}", credential.source());
        let client = GeminiClient::new(&config.model.endpoint, &credential);
        Ok(Self::with_service(config, Box::new(client)))
    }

    /// Build an analyst over any model service.
    pub fn with_service(config: Config, service: Box<dyn ModelService>) -> Self {
        tracing::debug!("Initializing SUNDAE v{} ({})", VERSION, service.name());
        Self { config, service }
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve the configured preferred model, falling back in order.
    pub async fn resolve_model(&self) -> std::result::Result<ResolvedModel, AnalysisError> {
        ModelResolver::new(self.service.as_ref())
            .resolve_config(&self.config.model)
            .await
    }

    /// Probe every candidate model and report each outcome.
    pub async fn check_models(&self) -> Vec<(String, std::result::Result<(), String>)> {
        ModelResolver::new(self.service.as_ref())
            .probe_all(&self.config.model)
            .await
    }

    /// The instruction sent with every image.
    pub fn instruction(&self) -> &str {
        prompt::instruction_or_default(Some(self.config.analysis.instruction.as_str()))
    }

    /// The oversize warning for `image`, if any. Never blocks a request.
    pub fn size_advisory(&self, image: &ImagePayload) -> Option<SizeAdvisory> {
        image.size_advisory(self.config.max_file_size_bytes())
    }

    /// Analyse one image with an already-resolved model.
    ///
    /// Lets a session resolve once and reuse the handle.
    pub async fn analyze_with(
        &self,
        model: &ResolvedModel,
        image: &ImagePayload,
    ) -> std::result::Result<AnalysisResult, AnalysisError> {
        let request = AnalysisRequest::new(image.clone(), self.instruction());
        Dispatcher::new(self.service.as_ref())
            .dispatch(model, &request)
            .await
    }

    /// Resolve a model and analyse one image.
    pub async fn analyze(
        &self,
        image: &ImagePayload,
    ) -> std::result::Result<AnalysisResult, AnalysisError> {
        if image.is_empty() {
            return Err(AnalysisError::InputInvalid {
                message: format!("{} is empty", image.name()),
            });
        }
        if let Some(advisory) = self.size_advisory(image) {
            tracing::warn!("{}: {advisory}", image.name());
        }
        let model = self.resolve_model().await?;
        self.analyze_with(&model, image).await
    }
}
