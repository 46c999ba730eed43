// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sentinelrs::config::settings::ProviderSettings;
use sentinelrs::domain::models::NarrativeProvenance;
use sentinelrs::domain::narrative::{NarrativeError, NarrativePrompt, NarrativeProvider};
use sentinelrs::domain::services::NarrativeAnalyzer;
use sentinelrs::infrastructure::narrative::{GeminiProvider, OpenAiProvider};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::helpers::SPECIFIC_NARRATIVE;

const GEMINI_PATH: &str = "/v1beta/models/gemini-pro:generateContent";

fn openai_settings(base_url: &str) -> ProviderSettings {
    ProviderSettings {
        api_key: Some("sk-test".to_string()),
        base_url: base_url.to_string(),
        model: "gpt-3.5-turbo".to_string(),
        timeout_ms: 2_000,
    }
}

fn gemini_settings(base_url: &str) -> ProviderSettings {
    ProviderSettings {
        api_key: Some("gm-test".to_string()),
        base_url: base_url.to_string(),
        model: "gemini-pro".to_string(),
        timeout_ms: 2_000,
    }
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn gemini_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

fn quota_error() -> ResponseTemplate {
    ResponseTemplate::new(429).set_body_json(json!({
        "error": {
            "message": "You exceeded your current quota, please check your plan and billing details.",
            "type": "insufficient_quota",
            "code": "insufficient_quota"
        }
    }))
}

fn prompt() -> NarrativePrompt {
    NarrativePrompt::for_url("http://malicious-site.com", Some(0.95))
}

#[tokio::test]
async fn test_openai_returns_content_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "gpt-3.5-turbo" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("  Looks like phishing.\n")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new(&openai_settings(&server.uri()));

    assert_eq!(provider.name(), "openai:gpt-3.5-turbo");
    assert_eq!(
        provider.generate(&prompt()).await,
        Ok("  Looks like phishing.\n".to_string())
    );
}

#[tokio::test]
async fn test_openai_blank_content_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(" \n ")))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new(&openai_settings(&server.uri()));

    assert!(matches!(
        provider.generate(&prompt()).await,
        Err(NarrativeError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_openai_quota_error_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(quota_error())
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new(&openai_settings(&server.uri()));
    let error = provider.generate(&prompt()).await.unwrap_err();

    assert!(error.is_quota_exhausted());
}

#[tokio::test]
async fn test_openai_server_error_is_not_quota() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream failure"))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new(&openai_settings(&server.uri()));

    assert_eq!(
        provider.generate(&prompt()).await,
        Err(NarrativeError::Api {
            status: 500,
            message: "upstream failure".to_string()
        })
    );
}

#[tokio::test]
async fn test_openai_without_key_is_not_configured() {
    let mut settings = openai_settings("http://127.0.0.1:9");
    settings.api_key = None;

    let provider = OpenAiProvider::new(&settings);

    assert_eq!(
        provider.generate(&prompt()).await,
        Err(NarrativeError::NotConfigured)
    );
}

#[tokio::test]
async fn test_gemini_joins_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .and(query_param("key", "gm-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Suspicious " }, { "text": "host.\n" }] }
            }]
        })))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(&gemini_settings(&server.uri()));

    assert_eq!(provider.name(), "gemini:gemini-pro");
    assert_eq!(
        provider.generate(&prompt()).await,
        Ok("Suspicious host.\n".to_string())
    );
}

#[tokio::test]
async fn test_gemini_resource_exhausted_is_quota() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED" }
        })))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(&gemini_settings(&server.uri()));

    assert_eq!(
        provider.generate(&prompt()).await,
        Err(NarrativeError::QuotaExhausted("Quota exceeded".to_string()))
    );
}

#[tokio::test]
async fn test_gemini_without_candidates_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(&gemini_settings(&server.uri()));

    assert!(matches!(
        provider.generate(&prompt()).await,
        Err(NarrativeError::InvalidResponse(_))
    ));
}

fn analyzer(server: &MockServer) -> NarrativeAnalyzer {
    let primary: Arc<dyn NarrativeProvider> =
        Arc::new(OpenAiProvider::new(&openai_settings(&server.uri())));
    let fallback: Arc<dyn NarrativeProvider> =
        Arc::new(GeminiProvider::new(&gemini_settings(&server.uri())));
    NarrativeAnalyzer::new(primary, Duration::from_secs(2))
        .with_fallback(fallback, Duration::from_secs(2))
}

/// 主提供方配额耗尽时由备用提供方产出，来源标记为 fallback
#[tokio::test]
async fn test_quota_exhaustion_switches_to_gemini() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(quota_error())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(SPECIFIC_NARRATIVE)))
        .expect(1)
        .mount(&server)
        .await;

    let result = analyzer(&server).analyze("http://malicious-site.com", Some(0.95)).await;

    assert_eq!(result.provenance, NarrativeProvenance::Fallback);
    assert_eq!(result.provider.as_deref(), Some("gemini:gemini-pro"));
    assert_eq!(result.text, SPECIFIC_NARRATIVE);
    assert!(!result.vague);
}

#[tokio::test]
async fn test_non_quota_failure_does_not_use_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(SPECIFIC_NARRATIVE)))
        .expect(0)
        .mount(&server)
        .await;

    let result = analyzer(&server).analyze("http://example.com", None).await;

    assert_eq!(result.provenance, NarrativeProvenance::None);
    assert_eq!(result.text, "GenAI analysis not available.");
    assert!(result.vague);
}

#[tokio::test]
async fn test_both_providers_exhausted_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(quota_error())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let result = analyzer(&server).analyze("http://example.com", Some(0.4)).await;

    assert_eq!(result.provenance, NarrativeProvenance::None);
    assert!(result.provider.is_none());
}
