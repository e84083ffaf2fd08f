//! End-to-end analysis against a mocked Gemini endpoint.

use httpmock::prelude::*;
use serde_json::json;
use std::path::Path;
use sundae_core::{
    AnalysisError, Analyst, Config, ImagePayload, OutputFormat, Presenter, SundaeError,
};

const REPLY: &str = "🔥 SUNDAE: SOL/USDT – LONG (Demand Reclaim)\n📍 Entry: 142.5\n🛑 Stop Loss: 137.9\n";

/// Config with every credential source inside `dir` and an unset env var.
fn config_in(dir: &Path, endpoint: &str) -> Config {
    let mut config = Config::default();
    config.model.endpoint = endpoint.to_string();
    config.model.preferred = "gemini-2.5-flash".to_string();
    config.model.fallbacks = vec![
        "gemini-2.0-flash-exp".to_string(),
        "gemini-1.5-flash".to_string(),
    ];
    config.credentials.env_vars = vec!["SUNDAE_E2E_UNSET_KEY".to_string()];
    config.credentials.dotenv_file = dir.join(".env").to_string_lossy().into_owned();
    config.credentials.key_file = dir
        .join("config")
        .join("gemini_api_key.txt")
        .to_string_lossy()
        .into_owned();
    config
}

fn write_png(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("sol_1h.png");
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0u8; 64]);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn not_found(model: &str) -> serde_json::Value {
    json!({"error": {"code": 404, "message": format!("models/{model} is not found"), "status": "NOT_FOUND"}})
}

#[tokio::test]
async fn key_file_only_second_fallback_available() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start_async().await;
    let config = config_in(dir.path(), &server.base_url());
    std::fs::create_dir_all(dir.path().join("config")).unwrap();
    std::fs::write(config.key_file_path(), "file-key\n").unwrap();

    let preferred = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/models/gemini-2.5-flash")
                .header("x-goog-api-key", "file-key");
            then.status(404).json_body(not_found("gemini-2.5-flash"));
        })
        .await;
    let first_fallback = server
        .mock_async(|when, then| {
            when.method(GET).path("/models/gemini-2.0-flash-exp");
            then.status(404).json_body(not_found("gemini-2.0-flash-exp"));
        })
        .await;
    let second_fallback = server
        .mock_async(|when, then| {
            when.method(GET).path("/models/gemini-1.5-flash");
            then.status(200).json_body(json!({
                "name": "models/gemini-1.5-flash",
                "displayName": "Gemini 1.5 Flash",
                "supportedGenerationMethods": ["generateContent"]
            }));
        })
        .await;
    let generate = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/models/gemini-1.5-flash:generateContent")
                .header("x-goog-api-key", "file-key")
                .body_contains("image/png");
            then.status(200).json_body(json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": REPLY}]}, "finishReason": "STOP"}]
            }));
        })
        .await;

    let image = ImagePayload::from_path(&write_png(dir.path()), &config.input).unwrap();
    let analyst = Analyst::from_config(config, None).unwrap();
    let result = analyst.analyze(&image).await.unwrap();

    preferred.assert_async().await;
    first_fallback.assert_async().await;
    second_fallback.assert_async().await;
    generate.assert_async().await;
    assert_eq!(result.model, "gemini-1.5-flash");
    assert_eq!(result.text, REPLY);
    assert_eq!(result.image_name, "sol_1h.png");

    let mut presenter = Presenter::new(Vec::new(), OutputFormat::Text, false);
    presenter.render(&result).unwrap();
    assert_eq!(presenter.into_inner(), REPLY.as_bytes());
}

#[tokio::test]
async fn every_model_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start_async().await;
    let config = config_in(dir.path(), &server.base_url());

    let lookups = server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/models/");
            then.status(403).json_body(json!({
                "error": {"code": 403, "message": "Permission denied", "status": "PERMISSION_DENIED"}
            }));
        })
        .await;
    let generate = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200);
        })
        .await;

    let image = ImagePayload::from_path(&write_png(dir.path()), &config.input).unwrap();
    let analyst = Analyst::from_config(config, Some("typed-key")).unwrap();
    let err = analyst.analyze(&image).await.unwrap_err();

    lookups.assert_hits_async(3).await;
    generate.assert_hits_async(0).await;
    match &err {
        AnalysisError::ModelUnavailable { attempts } => {
            let tried: Vec<&str> = attempts.iter().map(|a| a.model.as_str()).collect();
            assert_eq!(
                tried,
                vec!["gemini-2.5-flash", "gemini-2.0-flash-exp", "gemini-1.5-flash"]
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("Permission denied"));
}

#[tokio::test]
async fn missing_credential_contacts_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.path_contains("/");
            then.status(200);
        })
        .await;

    let config = config_in(dir.path(), &server.base_url());
    let err = Analyst::from_config(config, None).err().unwrap();

    any.assert_hits_async(0).await;
    assert!(matches!(
        err,
        SundaeError::Analysis(AnalysisError::CredentialMissing { .. })
    ));
}
