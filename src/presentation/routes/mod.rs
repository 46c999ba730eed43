// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::error;

use crate::domain::services::ThreatService;
use crate::presentation::errors::{error_response, INTERNAL_ERROR_MESSAGE};
use crate::presentation::handlers::analyze_handler;

/// 创建应用路由
///
/// # 参数
///
/// * `service` - 共享的威胁评估服务
///
/// # 返回值
///
/// 返回配置好的路由（含 CORS、请求追踪和 panic 兜底）
pub fn routes(service: Arc<ThreatService>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/v1/version", get(version))
        .route("/analyze", post(analyze_handler::analyze))
        .route("/v1/analyze", post(analyze_handler::analyze))
        .layer(Extension(service))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// 根路径，浏览器扩展用它判断服务是否在线
pub async fn index() -> &'static str {
    "URL Threat Detection API is running!"
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(panic = %detail, "Handler panicked");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
}
