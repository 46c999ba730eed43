// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;

/// 外部信誉查询的三态结果
///
/// `Unknown` 表示“无法判定”，与 `Clean` 不同，任何地方都不能把它当成 `Clean`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReputationResult {
    Threat,
    Clean,
    Unknown,
}

impl ReputationResult {
    pub fn is_threat(&self) -> bool {
        matches!(self, ReputationResult::Threat)
    }

    /// 对外的三态布尔表示：Threat → true，Clean → false，Unknown → null
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            ReputationResult::Threat => Some(true),
            ReputationResult::Clean => Some(false),
            ReputationResult::Unknown => None,
        }
    }
}

/// 单个信誉源的结果，`detail` 记录 Unknown 的原因
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub result: ReputationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SourceReport {
    pub fn new(source: impl Into<String>, result: ReputationResult) -> Self {
        Self {
            source: source.into(),
            result,
            detail: None,
        }
    }

    pub fn unknown(source: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            result: ReputationResult::Unknown,
            detail: Some(detail.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReputationReport {
    pub safe_browsing: SourceReport,
    pub virustotal: SourceReport,
}

impl ReputationReport {
    pub fn any_threat(&self) -> bool {
        self.safe_browsing.result.is_threat() || self.virustotal.result.is_threat()
    }
}
