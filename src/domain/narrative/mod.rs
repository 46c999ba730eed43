// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NarrativeError {
    #[error("Quota or rate limit exhausted: {0}")]
    QuotaExhausted(String),
    #[error("API key not configured")]
    NotConfigured,
    #[error("Timeout")]
    Timeout,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("API returned error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NarrativeError {
    /// 只有配额/限流类错误才会触发切换到备用提供方
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, NarrativeError::QuotaExhausted(_))
    }
}

/// 发送给生成式提供方的提示词
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativePrompt {
    pub system: String,
    pub user: String,
}

impl NarrativePrompt {
    pub const SYSTEM_PERSONA: &'static str = "You are a cybersecurity analyst. \
        You assess URLs for phishing, malware distribution and other suspicious patterns.";

    pub fn for_url(url: &str, prior_probability: Option<f64>) -> Self {
        let mut user = format!(
            "Analyze this URL: {url}\n\
            Assess whether it shows indicators of phishing, malware, or other suspicious \
            patterns (look-alike domains, raw IP hosts, credential lures, obfuscated paths, \
            unusual subdomains or query parameters). Give a concrete verdict and the specific \
            indicators that support it."
        );
        if let Some(p) = prior_probability {
            user.push_str(&format!(
                "\nA statistical URL classifier estimated the probability that this URL is \
                malicious at {:.2}.",
                p
            ));
        }
        Self {
            system: Self::SYSTEM_PERSONA.to_string(),
            user,
        }
    }
}

/// 生成式文本提供方
#[async_trait]
pub trait NarrativeProvider: Send + Sync {
    async fn generate(&self, prompt: &NarrativePrompt) -> Result<String, NarrativeError>;

    /// 提供方名称（含模型名），用于溯源
    fn name(&self) -> &str;
}
