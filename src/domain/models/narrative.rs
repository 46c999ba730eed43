// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;

/// 叙述文本的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeProvenance {
    Primary,
    Fallback,
    None,
}

impl NarrativeProvenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            NarrativeProvenance::Primary => "primary",
            NarrativeProvenance::Fallback => "fallback",
            NarrativeProvenance::None => "none",
        }
    }
}

/// 生成式分析的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeResult {
    pub text: String,
    pub provenance: NarrativeProvenance,
    /// 产出文本的提供方名称，未成功时为空
    pub provider: Option<String>,
    pub vague: bool,
}

impl NarrativeResult {
    pub fn is_available(&self) -> bool {
        self.provenance != NarrativeProvenance::None
    }
}
