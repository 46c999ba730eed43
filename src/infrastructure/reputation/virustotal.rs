// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::transport_error;
use crate::infrastructure::http_client;
use crate::config::settings::VirusTotalSettings;
use crate::domain::models::ReputationResult;
use crate::domain::reputation::{ReputationError, ReputationSource};

#[derive(Debug, Deserialize)]
struct SubmissionResponse {
    data: Option<SubmissionData>,
}

#[derive(Debug, Deserialize)]
struct SubmissionData {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnalysisResponse {
    data: AnalysisData,
}

#[derive(Debug, Deserialize)]
struct AnalysisData {
    attributes: AnalysisAttributes,
}

#[derive(Debug, Deserialize)]
struct AnalysisAttributes {
    status: Option<String>,
    results: Option<HashMap<String, EngineResult>>,
    stats: Option<AnalysisStats>,
}

#[derive(Debug, Deserialize)]
struct EngineResult {
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnalysisStats {
    malicious: Option<u64>,
}

/// 单次拉取分析报告的结论
#[derive(Debug, PartialEq)]
enum AnalysisState {
    Decided(ReputationResult),
    Pending,
}

impl AnalysisAttributes {
    fn malicious_count(&self) -> Option<u64> {
        match (&self.results, &self.stats) {
            (Some(results), _) => Some(
                results
                    .values()
                    .filter(|r| r.category.as_deref() == Some("malicious"))
                    .count() as u64,
            ),
            (None, Some(stats)) => stats.malicious,
            (None, None) => None,
        }
    }

    fn state(&self) -> Result<AnalysisState, ReputationError> {
        let count = self.malicious_count();
        if count.is_some_and(|c| c > 0) {
            return Ok(AnalysisState::Decided(ReputationResult::Threat));
        }

        // A clean verdict needs engine data; a bare status is not evidence
        match (self.status.as_deref(), count) {
            (Some("completed"), Some(_)) | (None, Some(_)) => {
                Ok(AnalysisState::Decided(ReputationResult::Clean))
            }
            (Some("completed"), None) => Err(ReputationError::InvalidResponse(
                "completed analysis carries no engine results".into(),
            )),
            (Some(_), _) => Ok(AnalysisState::Pending),
            (None, None) => Err(ReputationError::InvalidResponse(
                "analysis report has neither status nor results".into(),
            )),
        }
    }
}

/// VirusTotal v3 客户端
///
/// 两步协议：`POST /urls` 提交 URL 得到分析 id，再 `GET /analyses/{id}` 读取报告。
/// 报告仍在排队时按配置重新轮询，用尽次数仍未完成则返回错误（由网关降级为 Unknown）。
pub struct VirusTotalClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    poll_attempts: u32,
    poll_interval: Duration,
}

impl VirusTotalClient {
    pub fn new(settings: &VirusTotalSettings) -> Self {
        Self {
            client: http_client(settings.timeout()),
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            poll_attempts: settings.poll_attempts.max(1),
            poll_interval: settings.poll_interval(),
        }
    }

    async fn submit(&self, api_key: &str, url: &str) -> Result<String, ReputationError> {
        let response = self
            .client
            .post(format!("{}/urls", self.base_url))
            .header("x-apikey", api_key)
            .form(&[("url", url)])
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(ReputationError::Status(response.status().as_u16()));
        }

        let body: SubmissionResponse = response
            .json()
            .await
            .map_err(|e| ReputationError::InvalidResponse(e.to_string()))?;

        body.data
            .and_then(|d| d.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ReputationError::InvalidResponse("submission returned no analysis id".into()))
    }

    async fn fetch_analysis(
        &self,
        api_key: &str,
        analysis_id: &str,
    ) -> Result<AnalysisState, ReputationError> {
        let response = self
            .client
            .get(format!("{}/analyses/{}", self.base_url, analysis_id))
            .header("x-apikey", api_key)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(ReputationError::Status(response.status().as_u16()));
        }

        let body: AnalysisResponse = response
            .json()
            .await
            .map_err(|e| ReputationError::InvalidResponse(e.to_string()))?;

        body.data.attributes.state()
    }
}

#[async_trait]
impl ReputationSource for VirusTotalClient {
    async fn check(&self, url: &str) -> Result<ReputationResult, ReputationError> {
        let api_key = self.api_key.as_ref().ok_or(ReputationError::NotConfigured)?;

        let analysis_id = self.submit(api_key, url).await?;
        debug!(analysis_id = %analysis_id, "VirusTotal submission accepted");

        for attempt in 1..=self.poll_attempts {
            match self.fetch_analysis(api_key, &analysis_id).await? {
                AnalysisState::Decided(result) => return Ok(result),
                AnalysisState::Pending => {
                    debug!(attempt, "VirusTotal analysis still pending");
                    if attempt < self.poll_attempts {
                        tokio::time::sleep(self.poll_interval).await;
                    }
                }
            }
        }

        Err(ReputationError::AnalysisPending {
            attempts: self.poll_attempts,
        })
    }

    fn name(&self) -> &'static str {
        "virustotal"
    }
}
