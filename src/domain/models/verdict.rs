// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{LexicalOutcome, NarrativeResult, ReputationReport};

/// 默认判定阈值，偏保守（重精度轻召回）
pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.9;

/// 判定策略
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecisionPolicy {
    /// 规则 (a)：词法概率 >= 该值即判定为威胁
    pub decision_threshold: f64,
    /// 规则 (c)：词法概率 >= 该值且叙述含糊时判定为威胁
    pub vague_override_threshold: f64,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            decision_threshold: DEFAULT_DECISION_THRESHOLD,
            vague_override_threshold: DEFAULT_DECISION_THRESHOLD,
        }
    }
}

impl DecisionPolicy {
    pub fn new(decision_threshold: f64) -> Self {
        Self {
            decision_threshold,
            vague_override_threshold: decision_threshold,
        }
    }

    pub fn with_vague_override_threshold(mut self, threshold: f64) -> Self {
        self.vague_override_threshold = threshold;
        self
    }
}

/// 触发威胁判定的规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictRule {
    LexicalThreshold,
    SafeBrowsingMatch,
    VirusTotalDetection,
    VagueNarrativeOverride,
}

/// 最终裁决
///
/// 除结论外还保留全部输入信号、所用策略以及触发的规则，
/// 足以在事后复现判定过程。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub request_id: Uuid,
    pub evaluated_at: DateTime<Utc>,
    pub url: String,
    pub is_threat: bool,
    pub rules: Vec<VerdictRule>,
    pub lexical: LexicalOutcome,
    pub reputation: ReputationReport,
    pub narrative: NarrativeResult,
    pub policy: DecisionPolicy,
}

impl Verdict {
    pub fn fired(&self, rule: VerdictRule) -> bool {
        self.rules.contains(&rule)
    }

    pub fn message(&self) -> &'static str {
        if self.is_threat {
            "This URL is potentially malicious."
        } else {
            "This URL seems safe."
        }
    }
}
