// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含一次 URL 威胁评估的核心逻辑，按依赖从叶到根排列：
/// - 特征提取（feature_extractor）：URL 文本 → 固定宽度数值特征
/// - 词法评分（lexical_scorer）：特征 + 向量化文本 → 恶意概率
/// - 信誉网关（reputation_gateway）：并发查询外部黑名单，三态结果
/// - 叙述分析（narrative_analyzer）：生成式分析，带提供方回退链
/// - 裁决聚合（verdict_aggregator）：按策略合并全部信号
/// - 威胁服务（threat_service）：编排以上组件处理单个请求
///
/// 除威胁服务外，各服务都可以独立测试，只通过显式的数据类型相互连接。
pub mod feature_extractor;
pub mod lexical_scorer;
pub mod narrative_analyzer;
pub mod reputation_gateway;
pub mod threat_service;
pub mod verdict_aggregator;

pub use feature_extractor::FeatureExtractor;
pub use lexical_scorer::LexicalScorer;
pub use narrative_analyzer::NarrativeAnalyzer;
pub use reputation_gateway::ReputationGateway;
pub use threat_service::{ThreatService, ThreatServiceError};
pub use verdict_aggregator::VerdictAggregator;
