// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;

/// 词法分类器评分
///
/// `is_malicious` 由 `probability >= threshold` 得出（阈值包含在内）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LexicalScore {
    pub probability: f64,
    pub threshold: f64,
    pub is_malicious: bool,
}

impl LexicalScore {
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        Self {
            probability,
            threshold,
            is_malicious: probability >= threshold,
        }
    }

    /// 预测类别的概率，即 `max(p, 1 - p)`
    pub fn confidence(&self) -> f64 {
        self.probability.max(1.0 - self.probability)
    }
}

/// 单次请求中词法信号的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LexicalOutcome {
    Scored(LexicalScore),
    Unavailable { reason: String },
}

impl LexicalOutcome {
    pub fn score(&self) -> Option<&LexicalScore> {
        match self {
            LexicalOutcome::Scored(score) => Some(score),
            LexicalOutcome::Unavailable { .. } => None,
        }
    }

    pub fn probability(&self) -> Option<f64> {
        self.score().map(|s| s.probability)
    }
}
