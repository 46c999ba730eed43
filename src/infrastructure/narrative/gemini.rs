// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use super::transport_error;
use crate::infrastructure::http_client;
use crate::config::settings::ProviderSettings;
use crate::domain::narrative::{NarrativeError, NarrativePrompt, NarrativeProvider};

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    status: Option<String>,
}

fn classify_error(status: StatusCode, body: &str) -> NarrativeError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
    let message = parsed
        .as_ref()
        .map(|e| e.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());
    let exhausted = parsed
        .as_ref()
        .is_some_and(|e| e.status.as_deref() == Some("RESOURCE_EXHAUSTED"));

    if status == StatusCode::TOO_MANY_REQUESTS || exhausted {
        NarrativeError::QuotaExhausted(message)
    } else {
        NarrativeError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// Gemini `generateContent` 提供方，作为备用
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base_url: String,
    name: String,
}

impl GeminiProvider {
    pub fn new(settings: &ProviderSettings) -> Self {
        Self {
            client: http_client(settings.timeout()),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            api_base_url: settings.base_url.trim_end_matches('/').to_string(),
            name: format!("gemini:{}", settings.model),
        }
    }
}

#[async_trait]
impl NarrativeProvider for GeminiProvider {
    async fn generate(&self, prompt: &NarrativePrompt) -> Result<String, NarrativeError> {
        let api_key = self.api_key.as_ref().ok_or(NarrativeError::NotConfigured)?;

        let request_body = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": format!("{}\n\n{}", prompt.system, prompt.user) }]
                }
            ]
        });

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base_url, self.model
        );
        let response = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .json(&request_body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &error_text));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| NarrativeError::InvalidResponse(e.to_string()))?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(NarrativeError::InvalidResponse(
                "No text in Gemini response".into(),
            ));
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
