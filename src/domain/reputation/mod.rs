// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::ReputationResult;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReputationError {
    #[error("API key not configured")]
    NotConfigured,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Service returned status {0}")]
    Status(u16),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Analysis not finished after {attempts} polls")]
    AnalysisPending { attempts: u32 },
    #[error("Timeout")]
    Timeout,
}

/// 外部信誉源
///
/// 实现只返回确定的结论（Threat / Clean），
/// 任何失败都以错误返回，由网关统一降级为 Unknown。
#[async_trait]
pub trait ReputationSource: Send + Sync {
    async fn check(&self, url: &str) -> Result<ReputationResult, ReputationError>;

    /// Get the name of the reputation source
    fn name(&self) -> &'static str;
}
