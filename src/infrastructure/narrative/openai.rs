// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use super::transport_error;
use crate::infrastructure::http_client;
use crate::config::settings::ProviderSettings;
use crate::domain::narrative::{NarrativeError, NarrativePrompt, NarrativeProvider};

const QUOTA_CODES: &[&str] = &["insufficient_quota", "rate_limit_exceeded"];

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<Value>,
}

/// 将失败响应分类，配额/限流类错误单独识别
fn classify_error(status: StatusCode, body: &str) -> NarrativeError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
    let message = parsed
        .as_ref()
        .map(|e| e.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());

    let quota_code = parsed.as_ref().is_some_and(|e| {
        [e.code.as_ref().and_then(Value::as_str), e.kind.as_deref()]
            .into_iter()
            .flatten()
            .any(|code| QUOTA_CODES.contains(&code))
    });

    if status == StatusCode::TOO_MANY_REQUESTS || quota_code {
        NarrativeError::QuotaExhausted(message)
    } else {
        NarrativeError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// OpenAI 兼容的 chat completions 提供方
///
/// # 配置
///
/// - `api_key` - Bearer 令牌，未设置时直接返回 `NotConfigured`
/// - `model` - 模型名称（默认为 gpt-3.5-turbo）
/// - `base_url` - API 基础 URL（默认为 https://api.openai.com/v1）
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base_url: String,
    name: String,
}

impl OpenAiProvider {
    pub fn new(settings: &ProviderSettings) -> Self {
        Self {
            client: http_client(settings.timeout()),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            api_base_url: settings.base_url.trim_end_matches('/').to_string(),
            name: format!("openai:{}", settings.model),
        }
    }
}

#[async_trait]
impl NarrativeProvider for OpenAiProvider {
    async fn generate(&self, prompt: &NarrativePrompt) -> Result<String, NarrativeError> {
        let api_key = self.api_key.as_ref().ok_or(NarrativeError::NotConfigured)?;

        let request_body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": prompt.system
                },
                {
                    "role": "user",
                    "content": prompt.user
                }
            ],
            "temperature": 0.2
        });

        let url = format!("{}/chat/completions", self.api_base_url);
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &error_text));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| NarrativeError::InvalidResponse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| NarrativeError::InvalidResponse("No content in LLM response".into()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
