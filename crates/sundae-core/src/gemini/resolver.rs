//! Model resolution with an ordered fallback list.
//!
//! Candidates are consumed left to right and the first one that accepts
//! construction wins. There is no retry of a single name and no backoff.

use super::service::ModelService;
use crate::config::ModelConfig;
use crate::error::{AnalysisError, ModelAttempt};
use crate::types::ResolvedModel;

/// Resolves a preferred model name to a working handle.
pub struct ModelResolver<'a> {
    service: &'a dyn ModelService,
}

impl<'a> ModelResolver<'a> {
    pub fn new(service: &'a dyn ModelService) -> Self {
        Self { service }
    }

    /// Resolve using the configured preferred model and fallbacks.
    pub async fn resolve_config(&self, config: &ModelConfig) -> Result<ResolvedModel, AnalysisError> {
        self.resolve_candidates(&config.candidates()).await
    }

    /// Try `preferred`, then each of `fallbacks` in order.
    pub async fn resolve(
        &self,
        preferred: &str,
        fallbacks: &[String],
    ) -> Result<ResolvedModel, AnalysisError> {
        let config = ModelConfig {
            preferred: preferred.to_string(),
            fallbacks: fallbacks.to_vec(),
            ..ModelConfig::default()
        };
        self.resolve_config(&config).await
    }

    async fn resolve_candidates(&self, candidates: &[String]) -> Result<ResolvedModel, AnalysisError> {
        let mut attempts: Vec<ModelAttempt> = Vec::new();

        for name in candidates {
            tracing::debug!("Loading {} model {name}", self.service.name());
            match self.service.load_model(name).await {
                Ok(handle) => {
                    if attempts.is_empty() {
                        tracing::info!("Using model {name}");
                    } else {
                        tracing::info!(
                            "Using fallback model {name} after {} failed attempt(s)",
                            attempts.len()
                        );
                    }
                    return Ok(ResolvedModel {
                        handle,
                        skipped: attempts,
                    });
                }
                Err(error) => {
                    tracing::warn!("Model {name} unavailable: {error}");
                    attempts.push(ModelAttempt {
                        model: name.clone(),
                        error,
                    });
                }
            }
        }

        Err(AnalysisError::ModelUnavailable { attempts })
    }

    /// Probe every candidate without stopping at the first success.
    pub async fn probe_all(&self, config: &ModelConfig) -> Vec<(String, Result<(), String>)> {
        let mut report = Vec::new();
        for name in config.candidates() {
            let outcome = self
                .service
                .load_model(&name)
                .await
                .map(|_| ())
                .map_err(|e| format!("{e} ({})", e.hint()));
            report.push((name, outcome));
        }
        report
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::types::{AnalysisRequest, ModelHandle};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory service: models in `available` load, everything else 404s.
    pub(crate) struct FakeService {
        pub available: Vec<String>,
        pub reply: Result<String, ApiError>,
        pub loads: Mutex<Vec<String>>,
        pub generates: Mutex<usize>,
    }

    impl FakeService {
        pub(crate) fn new(available: &[&str], reply: &str) -> Self {
            Self {
                available: available.iter().map(|s| s.to_string()).collect(),
                reply: Ok(reply.to_string()),
                loads: Mutex::new(Vec::new()),
                generates: Mutex::new(0),
            }
        }

        pub(crate) fn loads(&self) -> Vec<String> {
            self.loads.lock().unwrap().clone()
        }

        pub(crate) fn generate_calls(&self) -> usize {
            *self.generates.lock().unwrap()
        }
    }

    #[async_trait]
    impl ModelService for FakeService {
        fn name(&self) -> &str {
            "fake"
        }

        async fn load_model(&self, model: &str) -> Result<ModelHandle, ApiError> {
            self.loads.lock().unwrap().push(model.to_string());
            if self.available.iter().any(|m| m == model) {
                Ok(ModelHandle::new(model))
            } else {
                Err(ApiError::new(format!("HTTP 404: models/{model} is not found"), Some(404)))
            }
        }

        async fn generate(
            &self,
            _model: &ModelHandle,
            _request: &AnalysisRequest,
        ) -> Result<String, ApiError> {
            *self.generates.lock().unwrap() += 1;
            self.reply.clone()
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_preferred_available() {
        let service = FakeService::new(&["a", "b"], "");
        let resolved = ModelResolver::new(&service)
            .resolve("a", &names(&["b"]))
            .await
            .unwrap();
        assert_eq!(resolved.model_used(), "a");
        assert!(!resolved.used_fallback());
        assert_eq!(service.loads(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_fallbacks_tried_in_declared_order() {
        let service = FakeService::new(&["c", "d"], "");
        let resolved = ModelResolver::new(&service)
            .resolve("a", &names(&["b", "c", "d"]))
            .await
            .unwrap();
        assert_eq!(resolved.model_used(), "c");
        assert_eq!(service.loads(), vec!["a", "b", "c"]);
        let skipped: Vec<&str> = resolved.skipped.iter().map(|a| a.model.as_str()).collect();
        assert_eq!(skipped, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_all_unavailable_enumerates_attempts() {
        let service = FakeService::new(&[], "");
        let err = ModelResolver::new(&service)
            .resolve("a", &names(&["b", "c"]))
            .await
            .unwrap_err();
        match &err {
            AnalysisError::ModelUnavailable { attempts } => {
                let tried: Vec<&str> = attempts.iter().map(|a| a.model.as_str()).collect();
                assert_eq!(tried, vec!["a", "b", "c"]);
                assert!(attempts.iter().all(|a| a.error.status_code == Some(404)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("a (") && msg.contains("b (") && msg.contains("c ("));
    }

    #[tokio::test]
    async fn test_duplicate_names_tried_once() {
        let service = FakeService::new(&[], "");
        let _ = ModelResolver::new(&service)
            .resolve("a", &names(&["a", "b", "b"]))
            .await;
        assert_eq!(service.loads(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_probe_all_does_not_short_circuit() {
        let service = FakeService::new(&["a"], "");
        let config = ModelConfig {
            preferred: "a".into(),
            fallbacks: names(&["b"]),
            ..ModelConfig::default()
        };
        let report = ModelResolver::new(&service).probe_all(&config).await;
        assert_eq!(report.len(), 2);
        assert!(report[0].1.is_ok());
        assert!(report[1].1.as_ref().unwrap_err().contains("unknown"));
    }
}
