// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 模型产物
///
/// 训练流程导出的 JSON 产物的加载与推理实现：
/// - 向量化器（vectorizer）：TF-IDF，支持 word / char / char_wb 分析器
/// - 分类器（classifier）：逻辑回归、随机森林、梯度提升树
/// - 产物加载（artifacts）：读取、校验并组装为 [`ModelBundle`]
pub mod artifacts;
pub mod classifier;
pub mod vectorizer;

pub use artifacts::ModelBundle;
pub use classifier::ArtifactClassifier;
pub use vectorizer::TfidfVectorizer;
