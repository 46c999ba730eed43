// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

use crate::{
    application::dto::{analyze_request::AnalyzeRequestDto, analyze_response::AnalyzeResponseDto},
    domain::{models::EmptyUrlError, services::ThreatService},
    presentation::errors::AppError,
};

/// 处理 URL 威胁评估请求
///
/// # 参数
///
/// * `service` - 威胁评估服务
/// * `payload` - 请求体 `{ "url": "..." }`
///
/// # 返回值
///
/// 成功时返回裁决（200）
///
/// # 错误
///
/// - 请求体缺失、JSON 无法解析、`url` 缺失或为空白时返回 400 `No URL provided`，不调用引擎
/// - 内部错误返回 500，不包含任何部分裁决
pub async fn analyze(
    Extension(service): Extension<Arc<ThreatService>>,
    payload: Result<Json<AnalyzeRequestDto>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        debug!(reason = %rejection.body_text(), "Rejected analyze request body");
        EmptyUrlError
    })?;

    payload.validate().map_err(|_| EmptyUrlError)?;
    let url = payload.into_record()?;

    let verdict = service.analyze(url).await?;
    Ok(Json(AnalyzeResponseDto::from(&verdict)))
}
