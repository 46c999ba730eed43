// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tracing::info;

use crate::config::settings::Settings;
use crate::domain::narrative::NarrativeProvider;
use crate::domain::reputation::ReputationSource;
use crate::domain::services::{
    LexicalScorer, NarrativeAnalyzer, ReputationGateway, ThreatService, VerdictAggregator,
};
use crate::infrastructure::narrative::{GeminiProvider, OpenAiProvider};
use crate::infrastructure::reputation::{SafeBrowsingClient, VirusTotalClient};

/// 按配置组装信誉网关
pub fn build_reputation_gateway(settings: &Settings) -> ReputationGateway {
    let safe_browsing: Arc<dyn ReputationSource> =
        Arc::new(SafeBrowsingClient::new(&settings.safe_browsing));
    let virustotal: Arc<dyn ReputationSource> =
        Arc::new(VirusTotalClient::new(&settings.virustotal));

    ReputationGateway::new(
        safe_browsing,
        settings.safe_browsing.timeout(),
        virustotal,
        settings.virustotal.timeout(),
    )
}

/// 按配置组装叙述分析器（OpenAI 为主，Gemini 为备用）
pub fn build_narrative_analyzer(settings: &Settings) -> NarrativeAnalyzer {
    let narrative = &settings.narrative;
    let primary: Arc<dyn NarrativeProvider> = Arc::new(OpenAiProvider::new(&narrative.primary));
    let fallback: Arc<dyn NarrativeProvider> = Arc::new(GeminiProvider::new(&narrative.fallback));

    NarrativeAnalyzer::new(primary, narrative.primary.timeout())
        .with_fallback(fallback, narrative.fallback.timeout())
        .with_min_length(narrative.min_length)
}

/// 组装完整的威胁评估服务
///
/// 词法评分器需要事先构造（模型加载和宽度校验失败属于启动期致命错误）。
pub fn build_threat_service(settings: &Settings, scorer: LexicalScorer) -> ThreatService {
    let policy = settings.policy.decision_policy();

    info!(
        safe_browsing = settings.safe_browsing.api_key.is_some(),
        virustotal = settings.virustotal.api_key.is_some(),
        primary_narrative = settings.narrative.primary.api_key.is_some(),
        fallback_narrative = settings.narrative.fallback.api_key.is_some(),
        decision_threshold = policy.decision_threshold,
        vague_override_threshold = policy.vague_override_threshold,
        "Building threat service"
    );

    ThreatService::new(
        Arc::new(scorer),
        build_reputation_gateway(settings),
        build_narrative_analyzer(settings),
        VerdictAggregator::new(policy),
    )
}
