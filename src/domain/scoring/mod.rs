// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::PathBuf;
use thiserror::Error;

/// 模型相关错误
///
/// 加载和宽度校验类错误只会在启动阶段出现，属于致命错误；
/// `Transform` / `Prediction` 是单个请求的错误，由调用方降级处理。
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse model artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),
    #[error("Feature width mismatch: classifier expects {expected} features, extractor and vectorizer produce {actual}")]
    WidthMismatch { expected: usize, actual: usize },
    #[error("Vectorizer transform failed: {0}")]
    Transform(String),
    #[error("Classifier prediction failed: {0}")]
    Prediction(String),
}

/// 稀疏向量，`entries` 中的列号互不重复且小于 `width`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    pub width: usize,
    pub entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn new(width: usize, entries: Vec<(usize, f64)>) -> Self {
        Self { width, entries }
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }
}

/// 已拟合的文本向量化器
pub trait TextVectorizer: Send + Sync {
    /// 输出向量的宽度（词表大小）
    fn width(&self) -> usize;

    fn transform(&self, text: &str) -> Result<SparseVector, ModelError>;
}

/// 已训练的二分类器
pub trait ProbabilityClassifier: Send + Sync {
    /// 训练时的输入宽度
    fn n_features(&self) -> usize;

    /// 返回“恶意”类别的概率
    fn predict_proba(&self, features: &[f64]) -> Result<f64, ModelError>;
}
