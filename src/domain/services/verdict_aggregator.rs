// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::models::{
    DecisionPolicy, LexicalOutcome, NarrativeResult, ReputationReport, UrlRecord, Verdict,
    VerdictRule,
};

/// 裁决聚合器
///
/// 对各信号做逻辑或，任意一条规则成立即为威胁：
///
/// - (a) 词法概率 `>= decision_threshold`
/// - (b) 任一信誉源结果为 `Threat`
/// - (c) 词法概率 `>= vague_override_threshold` 且叙述含糊
///
/// `Unknown` 信誉结果和不可用的词法评分不参与任何规则，也不会压制其他规则。
/// 聚合本身是纯函数，不会失败。
#[derive(Debug, Clone, Copy, Default)]
pub struct VerdictAggregator {
    policy: DecisionPolicy,
}

impl VerdictAggregator {
    pub fn new(policy: DecisionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DecisionPolicy {
        self.policy
    }

    pub fn aggregate(
        &self,
        url: &UrlRecord,
        lexical: LexicalOutcome,
        reputation: ReputationReport,
        narrative: NarrativeResult,
    ) -> Verdict {
        let mut rules = Vec::new();
        let probability = lexical.probability();

        if probability.is_some_and(|p| p >= self.policy.decision_threshold) {
            rules.push(VerdictRule::LexicalThreshold);
        }
        if reputation.safe_browsing.result.is_threat() {
            rules.push(VerdictRule::SafeBrowsingMatch);
        }
        if reputation.virustotal.result.is_threat() {
            rules.push(VerdictRule::VirusTotalDetection);
        }
        if narrative.vague
            && probability.is_some_and(|p| p >= self.policy.vague_override_threshold)
        {
            rules.push(VerdictRule::VagueNarrativeOverride);
        }

        let is_threat = !rules.is_empty();
        debug!(url = url.as_str(), is_threat, ?rules, "Verdict aggregated");

        Verdict {
            request_id: Uuid::new_v4(),
            evaluated_at: Utc::now(),
            url: url.as_str().to_string(),
            is_threat,
            rules,
            lexical,
            reputation,
            narrative,
            policy: self.policy,
        }
    }
}
