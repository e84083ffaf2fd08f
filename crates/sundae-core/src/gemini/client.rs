//! Gemini REST client.
//!
//! Model construction is `GET /models/{name}`; analysis is
//! `POST /models/{name}:generateContent` with an inline base64 image part
//! followed by the instruction text. The key travels in the
//! `x-goog-api-key` header so it never appears in URLs or logs.

use super::service::ModelService;
use crate::credential::Credential;
use crate::error::ApiError;
use crate::types::{AnalysisRequest, ModelHandle};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Gemini provider over the public REST API.
pub struct GeminiClient {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(endpoint: &str, credential: &Credential) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: credential.expose().to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.endpoint, model.trim_start_matches("models/"))
    }
}

// --- Request types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
    Text {
        text: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: String,
    data: String,
}

// --- Response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turn a non-success response into an `ApiError` with the vendor's message.
async fn error_from_response(resp: reqwest::Response) -> ApiError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    ApiError::new(format!("HTTP {status}: {detail}"), Some(status.as_u16()))
}

fn transport_error(context: &str, e: reqwest::Error) -> ApiError {
    let message = if e.is_timeout() {
        format!("{context} timed out: {e}")
    } else if e.is_connect() {
        format!("{context} could not connect: {e}")
    } else {
        format!("{context} failed: {e}")
    };
    ApiError::new(message, None)
}

#[async_trait]
impl ModelService for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn load_model(&self, model: &str) -> Result<ModelHandle, ApiError> {
        let resp = self
            .client
            .get(self.model_url(model))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| transport_error("Gemini model lookup", e))?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let info: ModelInfo = resp.json().await.map_err(|e| {
            ApiError::new(format!("Failed to parse Gemini model info: {e}"), None)
        })?;

        if !info.supported_generation_methods.is_empty()
            && !info
                .supported_generation_methods
                .iter()
                .any(|m| m == "generateContent")
        {
            return Err(ApiError::new(
                format!("{model} does not support generateContent"),
                None,
            ));
        }

        Ok(ModelHandle {
            name: model.to_string(),
            display_name: info.display_name,
        })
    }

    async fn generate(
        &self,
        model: &ModelHandle,
        request: &AnalysisRequest,
    ) -> Result<String, ApiError> {
        let image = request.image();
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::InlineData {
                        inline_data: Blob {
                            mime_type: image.format().mime_type().to_string(),
                            data: image.to_base64(),
                        },
                    },
                    Part::Text {
                        text: request.instruction().to_string(),
                    },
                ],
            }],
        };

        let url = format!("{}:generateContent", self.model_url(&model.name));
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("Gemini request", e))?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let generated: GenerateContentResponse = resp.json().await.map_err(|e| {
            ApiError::new(format!("Failed to parse Gemini response: {e}"), None)
        })?;

        if let Some(reason) = generated
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
        {
            return Err(ApiError::new(
                format!("Gemini blocked the request: {reason}"),
                None,
            ));
        }

        let Some(candidate) = generated.candidates.into_iter().next() else {
            return Err(ApiError::new("Gemini returned no candidates", None));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
            return Err(ApiError::new(
                format!("Gemini returned empty response (finish reason: {reason})"),
                None,
            ));
        }

        Ok(text)
    }
}
