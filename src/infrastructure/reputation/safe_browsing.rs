// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::transport_error;
use crate::infrastructure::http_client;
use crate::config::settings::SafeBrowsingSettings;
use crate::domain::models::ReputationResult;
use crate::domain::reputation::{ReputationError, ReputationSource};

#[derive(Debug, Deserialize)]
struct ThreatMatchesResponse {
    #[serde(default)]
    matches: Vec<Value>,
}

/// Google Safe Browsing v4 `threatMatches:find` 客户端
///
/// 返回非空 `matches` 即为 Threat，空对象为 Clean。
pub struct SafeBrowsingClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    client_id: String,
    threat_types: Vec<String>,
}

impl SafeBrowsingClient {
    pub fn new(settings: &SafeBrowsingSettings) -> Self {
        Self {
            client: http_client(settings.timeout()),
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client_id: settings.client_id.clone(),
            threat_types: settings.threat_types.clone(),
        }
    }

    fn request_body(&self, url: &str) -> Value {
        json!({
            "client": {
                "clientId": self.client_id,
                "clientVersion": env!("CARGO_PKG_VERSION"),
            },
            "threatInfo": {
                "threatTypes": self.threat_types,
                "platformTypes": ["ANY_PLATFORM"],
                "threatEntryTypes": ["URL"],
                "threatEntries": [{ "url": url }],
            }
        })
    }
}

#[async_trait]
impl ReputationSource for SafeBrowsingClient {
    async fn check(&self, url: &str) -> Result<ReputationResult, ReputationError> {
        let api_key = self.api_key.as_ref().ok_or(ReputationError::NotConfigured)?;

        let endpoint = format!("{}/v4/threatMatches:find", self.base_url);
        let response = self
            .client
            .post(&endpoint)
            .query(&[("key", api_key)])
            .json(&self.request_body(url))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(ReputationError::Status(response.status().as_u16()));
        }

        let body: ThreatMatchesResponse = response
            .json()
            .await
            .map_err(|e| ReputationError::InvalidResponse(e.to_string()))?;

        debug!(matches = body.matches.len(), "Safe Browsing lookup finished");
        if body.matches.is_empty() {
            Ok(ReputationResult::Clean)
        } else {
            Ok(ReputationResult::Threat)
        }
    }

    fn name(&self) -> &'static str {
        "google_safe_browsing"
    }
}
