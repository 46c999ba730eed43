// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::models::{LexicalOutcome, ReputationReport, Verdict, VerdictRule};

/// `/analyze` 的响应体
///
/// 信誉字段为三态：`true` 威胁、`false` 干净、`null` 无法判定。
#[derive(Debug, Serialize)]
pub struct AnalyzeResponseDto {
    pub url: String,
    pub threat: bool,
    pub message: String,
    pub malicious_probability: Option<f64>,
    pub ai_prediction: Option<String>,
    pub confidence: Option<f64>,
    pub google_safe_browsing: Option<bool>,
    pub virustotal: Option<bool>,
    pub genai_analysis: String,
    pub genai_status: String,
    pub genai_vague: bool,
    pub audit: AuditDto,
}

/// 复现判定所需的审计信息
#[derive(Debug, Serialize)]
pub struct AuditDto {
    pub request_id: Uuid,
    pub evaluated_at: DateTime<Utc>,
    pub rules: Vec<VerdictRule>,
    pub decision_threshold: f64,
    pub vague_override_threshold: f64,
    pub lexical: LexicalOutcome,
    pub reputation: ReputationReport,
    pub narrative_provider: Option<String>,
}

impl From<&Verdict> for AnalyzeResponseDto {
    fn from(verdict: &Verdict) -> Self {
        let score = verdict.lexical.score();

        Self {
            url: verdict.url.clone(),
            threat: verdict.is_threat,
            message: verdict.message().to_string(),
            malicious_probability: score.map(|s| s.probability),
            ai_prediction: score.map(|s| {
                let label = if s.is_malicious { "malicious" } else { "safe" };
                label.to_string()
            }),
            confidence: score.map(|s| s.confidence()),
            google_safe_browsing: verdict.reputation.safe_browsing.result.as_flag(),
            virustotal: verdict.reputation.virustotal.result.as_flag(),
            genai_analysis: verdict.narrative.text.clone(),
            genai_status: verdict.narrative.provenance.as_str().to_string(),
            genai_vague: verdict.narrative.vague,
            audit: AuditDto {
                request_id: verdict.request_id,
                evaluated_at: verdict.evaluated_at,
                rules: verdict.rules.clone(),
                decision_threshold: verdict.policy.decision_threshold,
                vague_override_threshold: verdict.policy.vague_override_threshold,
                lexical: verdict.lexical.clone(),
                reputation: verdict.reputation.clone(),
                narrative_provider: verdict.narrative.provider.clone(),
            },
        }
    }
}
