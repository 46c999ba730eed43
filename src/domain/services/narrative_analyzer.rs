// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::models::{NarrativeProvenance, NarrativeResult};
use crate::domain::narrative::{NarrativeError, NarrativePrompt, NarrativeProvider};

/// 没有任何提供方成功时返回的占位文本
pub const UNAVAILABLE_PLACEHOLDER: &str = "GenAI analysis not available.";

/// 默认最短有效叙述长度（字符数，去除首尾空白后）
pub const DEFAULT_MIN_LENGTH: usize = 80;

/// 表示"拒绝表态"的措辞，命中任意一条即视为含糊（大小写不敏感）
pub const HEDGING_PHRASES: &[&str] = &[
    "i cannot determine",
    "i can't determine",
    "unable to determine",
    "cannot be determined",
    "i'm not able to",
    "i am not able to",
    "without further information",
    "without more information",
    "without more context",
    "more context is needed",
    "it is difficult to say",
    "hard to say",
    "cannot definitively",
    "can't definitively",
    "exercise caution",
    "proceed with caution",
    "always be cautious",
    "it's always a good idea",
    "it is always a good idea",
    "may or may not be",
];

/// 判断叙述是否含糊：过短，或包含任一模糊措辞
pub fn is_vague(text: &str, min_length: usize) -> bool {
    let trimmed = text.trim();
    if trimmed.chars().count() < min_length {
        return true;
    }
    let lowered = trimmed.to_lowercase();
    HEDGING_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

/// 回退链的状态
enum Stage {
    Primary,
    Fallback,
    Unavailable,
}

/// 叙述分析器
///
/// 状态机：`Primary` 失败时，只有配额/限流类错误才进入 `Fallback`，
/// 其余错误以及 `Fallback` 的任何失败都进入 `Unavailable`，返回占位文本。
/// 结果中的来源标记如实记录是哪一方产出的文本。
pub struct NarrativeAnalyzer {
    primary: Arc<dyn NarrativeProvider>,
    primary_timeout: Duration,
    fallback: Option<Arc<dyn NarrativeProvider>>,
    fallback_timeout: Duration,
    min_length: usize,
}

impl NarrativeAnalyzer {
    pub fn new(primary: Arc<dyn NarrativeProvider>, primary_timeout: Duration) -> Self {
        Self {
            primary,
            primary_timeout,
            fallback: None,
            fallback_timeout: primary_timeout,
            min_length: DEFAULT_MIN_LENGTH,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn NarrativeProvider>, timeout: Duration) -> Self {
        self.fallback = Some(fallback);
        self.fallback_timeout = timeout;
        self
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub async fn analyze(&self, url: &str, prior_probability: Option<f64>) -> NarrativeResult {
        let prompt = NarrativePrompt::for_url(url, prior_probability);
        let mut stage = Stage::Primary;

        loop {
            stage = match stage {
                Stage::Primary => {
                    match call(self.primary.as_ref(), self.primary_timeout, &prompt).await {
                        Ok(text) => {
                            return self.produced(text, NarrativeProvenance::Primary, self.primary.as_ref())
                        }
                        Err(e) if e.is_quota_exhausted() => {
                            warn!(provider = self.primary.name(), error = %e, "Primary narrative provider exhausted, trying fallback");
                            Stage::Fallback
                        }
                        Err(e) => {
                            warn!(provider = self.primary.name(), error = %e, "Primary narrative provider failed");
                            Stage::Unavailable
                        }
                    }
                }
                Stage::Fallback => match &self.fallback {
                    Some(fallback) => {
                        match call(fallback.as_ref(), self.fallback_timeout, &prompt).await {
                            Ok(text) => {
                                return self.produced(text, NarrativeProvenance::Fallback, fallback.as_ref())
                            }
                            Err(e) => {
                                warn!(provider = fallback.name(), error = %e, "Fallback narrative provider failed");
                                Stage::Unavailable
                            }
                        }
                    }
                    None => {
                        debug!("No fallback narrative provider configured");
                        Stage::Unavailable
                    }
                },
                Stage::Unavailable => {
                    counter!("sentinel_narrative_provenance_total", "provenance" => "none")
                        .increment(1);
                    counter!("sentinel_signal_degraded_total", "signal" => "narrative", "reason" => "unavailable")
                        .increment(1);
                    return NarrativeResult {
                        text: UNAVAILABLE_PLACEHOLDER.to_string(),
                        provenance: NarrativeProvenance::None,
                        provider: None,
                        vague: true,
                    };
                }
            };
        }
    }

    fn produced(
        &self,
        text: String,
        provenance: NarrativeProvenance,
        provider: &dyn NarrativeProvider,
    ) -> NarrativeResult {
        let vague = is_vague(&text, self.min_length);
        info!(provider = provider.name(), provenance = provenance.as_str(), vague, "Narrative generated");
        counter!("sentinel_narrative_provenance_total", "provenance" => provenance.as_str())
            .increment(1);

        NarrativeResult {
            text,
            provenance,
            provider: Some(provider.name().to_string()),
            vague,
        }
    }
}

async fn call(
    provider: &dyn NarrativeProvider,
    timeout: Duration,
    prompt: &NarrativePrompt,
) -> Result<String, NarrativeError> {
    match tokio::time::timeout(timeout, provider.generate(prompt)).await {
        Ok(result) => result,
        Err(_) => Err(NarrativeError::Timeout),
    }
}
