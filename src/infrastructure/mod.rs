// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节，负责与外部系统和文件的交互。
///
/// 包含的子模块：
/// - 组装（factory）：按配置构建各组件
/// - 模型产物（model）：向量化器与分类器的加载和推理
/// - 信誉源（reputation）：Safe Browsing 与 VirusTotal 客户端
/// - 叙述提供方（narrative）：OpenAI 兼容接口与 Gemini 客户端
/// - 可观测性（observability）：Prometheus 指标导出
///
/// 基础设施层遵循依赖倒置原则，实现领域层定义的 trait，
/// 确保领域层保持纯粹的业务逻辑，不受技术实现的影响。
pub mod factory;
pub mod model;
pub mod narrative;
pub mod observability;
pub mod reputation;

use std::time::Duration;
use tracing::warn;

/// 构造带超时的 HTTP 客户端，构造失败时退回默认客户端
///
/// 退回的客户端没有请求级超时，只剩调用方的 `tokio::time::timeout` 兜底。
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, timeout_ms = timeout.as_millis() as u64, "Failed to build HTTP client, using defaults without request timeout");
            reqwest::Client::default()
        })
}
