// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use sentinelrs::domain::models::ReputationResult;
use sentinelrs::domain::reputation::ReputationError;
use sentinelrs::presentation::routes;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

use super::helpers::{PanickingClassifier, PanickingProvider, Signals};

/// 根路径和健康检查测试
#[tokio::test]
async fn test_index_and_health() {
    let server = Signals::new(0.1).server();

    let index = server.get("/").await;
    index.assert_status_ok();
    index.assert_text("URL Threat Detection API is running!");

    let health = server.get("/health").await;
    health.assert_status_ok();
    health.assert_text("OK");

    let version = server.get("/v1/version").await;
    version.assert_text(env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_missing_url_is_rejected() {
    let server = Signals::new(0.1).server();

    for body in [json!({}), json!({ "url": "" }), json!({ "url": "   " }), json!({ "url": null })] {
        let response = server.post("/analyze").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "No URL provided" }));
    }
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let server = Signals::new(0.1).server();

    let response = server.post("/analyze").text("url=http://example.com").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "error": "No URL provided" }));

    let response = server.post("/analyze").json(&json!({ "url": 42 })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_response_shape() {
    let server = Signals::new(0.95)
        .reputation(Ok(ReputationResult::Clean), Err(ReputationError::Status(503)))
        .server();

    let response = server
        .post("/analyze")
        .json(&json!({ "url": "http://malicious-site.com" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["url"], "http://malicious-site.com");
    assert_eq!(body["threat"], true);
    assert_eq!(body["message"], "This URL is potentially malicious.");
    assert_eq!(body["malicious_probability"], 0.95);
    assert_eq!(body["ai_prediction"], "malicious");
    assert_eq!(body["confidence"], 0.95);
    assert_eq!(body["google_safe_browsing"], false);
    assert_eq!(body["virustotal"], Value::Null);
    assert_eq!(body["genai_status"], "primary");
    assert_eq!(body["genai_vague"], false);
    assert_eq!(body["audit"]["rules"], json!(["lexical_threshold"]));
    assert_eq!(body["audit"]["decision_threshold"], 0.9);
    assert_eq!(body["audit"]["reputation"]["virustotal"]["result"], "unknown");
    assert!(body["audit"]["request_id"].is_string());
}

#[tokio::test]
async fn test_versioned_route_and_safe_verdict() {
    let server = Signals::new(0.1).server();

    let response = server
        .post("/v1/analyze")
        .json(&json!({ "url": "https://www.wikipedia.org/" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["threat"], false);
    assert_eq!(body["message"], "This URL seems safe.");
    assert_eq!(body["ai_prediction"], "safe");
}

#[tokio::test]
async fn test_internal_errors_do_not_leak_verdicts() {
    let server = Signals::new(0.0)
        .classifier(Arc::new(PanickingClassifier))
        .server();

    let response = server
        .post("/analyze")
        .json(&json!({ "url": "http://example.com" }))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn test_handler_panic_is_caught() {
    let server = Signals::new(0.5)
        .narrative(Arc::new(PanickingProvider))
        .server();

    let response = server
        .post("/analyze")
        .json(&json!({ "url": "http://example.com" }))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "error": "Internal server error" }));
}

/// CORS 测试
///
/// 验证任意来源的预检请求都被允许（浏览器扩展客户端）
#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = routes::routes(Arc::new(Signals::new(0.1).build()));

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/analyze")
                .header("origin", "chrome-extension://abcdef")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}
