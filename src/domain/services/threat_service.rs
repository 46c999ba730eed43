// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::models::{LexicalOutcome, UrlRecord, Verdict};
use crate::domain::services::lexical_scorer::LexicalScorer;
use crate::domain::services::narrative_analyzer::NarrativeAnalyzer;
use crate::domain::services::reputation_gateway::ReputationGateway;
use crate::domain::services::verdict_aggregator::VerdictAggregator;

#[derive(Error, Debug)]
pub enum ThreatServiceError {
    #[error("Internal error: {0}")]
    Internal(String),
}

/// 威胁评估服务
///
/// 编排一次请求的全部信号：
/// 信誉查询与"词法评分 → 叙述分析"这条链并发执行（叙述分析需要词法概率作为先验），
/// 全部结束或降级后交给聚合器得出裁决。
pub struct ThreatService {
    lexical: Arc<LexicalScorer>,
    reputation: ReputationGateway,
    narrative: NarrativeAnalyzer,
    aggregator: VerdictAggregator,
}

impl ThreatService {
    pub fn new(
        lexical: Arc<LexicalScorer>,
        reputation: ReputationGateway,
        narrative: NarrativeAnalyzer,
        aggregator: VerdictAggregator,
    ) -> Self {
        Self {
            lexical,
            reputation,
            narrative,
            aggregator,
        }
    }

    pub async fn analyze(&self, url: UrlRecord) -> Result<Verdict, ThreatServiceError> {
        let started = Instant::now();

        let lexical_then_narrative = async {
            let lexical = self.score_lexical(&url).await?;
            let narrative = self.narrative.analyze(url.as_str(), lexical.probability()).await;
            Ok::<_, ThreatServiceError>((lexical, narrative))
        };

        let (reputation, signals) = tokio::join!(
            self.reputation.check_reputation(url.as_str()),
            lexical_then_narrative
        );
        let (lexical, narrative) = signals?;

        let verdict = self.aggregator.aggregate(&url, lexical, reputation, narrative);

        let elapsed = started.elapsed();
        histogram!("sentinel_analysis_duration_seconds").record(elapsed.as_secs_f64());
        counter!(
            "sentinel_verdicts_total",
            "outcome" => if verdict.is_threat { "threat" } else { "safe" }
        )
        .increment(1);

        info!(
            request_id = %verdict.request_id,
            url = verdict.url.as_str(),
            threat = verdict.is_threat,
            rules = ?verdict.rules,
            elapsed_ms = elapsed.as_millis() as u64,
            "URL analyzed"
        );

        Ok(verdict)
    }

    async fn score_lexical(&self, url: &UrlRecord) -> Result<LexicalOutcome, ThreatServiceError> {
        let scorer = self.lexical.clone();
        let raw = url.as_str().to_string();

        // Model evaluation is CPU bound
        let scored = tokio::task::spawn_blocking(move || scorer.score(&raw))
            .await
            .map_err(|e| ThreatServiceError::Internal(format!("lexical scoring task failed: {}", e)))?;

        Ok(match scored {
            Ok(score) => LexicalOutcome::Scored(score),
            Err(e) => {
                warn!(error = %e, "Lexical scoring failed, signal unavailable");
                counter!("sentinel_signal_degraded_total", "signal" => "lexical", "reason" => "error")
                    .increment(1);
                LexicalOutcome::Unavailable {
                    reason: e.to_string(),
                }
            }
        })
    }
}
