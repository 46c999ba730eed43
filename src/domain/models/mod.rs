// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了一次 URL 威胁评估中流转的全部实体，包括：
/// - 输入记录（url_record）：待评估的原始 URL 文本
/// - 特征向量（features）：词法/结构特征
/// - 词法评分（lexical）：分类器给出的恶意概率
/// - 信誉结果（reputation）：外部黑名单的三态结果
/// - 叙述结果（narrative）：生成式分析文本及其来源
/// - 裁决（verdict）：最终结论及审计信息
///
/// 所有实体都只在单个请求内存在，请求结束即丢弃。
pub mod features;
pub mod lexical;
pub mod narrative;
pub mod reputation;
pub mod url_record;
pub mod verdict;

pub use features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use lexical::{LexicalOutcome, LexicalScore};
pub use narrative::{NarrativeProvenance, NarrativeResult};
pub use reputation::{ReputationReport, ReputationResult, SourceReport};
pub use url_record::{EmptyUrlError, UrlRecord};
pub use verdict::{DecisionPolicy, Verdict, VerdictRule};
