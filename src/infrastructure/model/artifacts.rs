// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::classifier::{ArtifactClassifier, ClassifierArtifact};
use super::vectorizer::{TfidfVectorizer, VectorizerArtifact};
use crate::config::settings::ModelSettings;
use crate::domain::scoring::{ModelError, TextVectorizer};
use crate::domain::services::LexicalScorer;

/// 启动时加载的模型产物
///
/// 加载后只读，通过 `Arc` 在请求间共享。
#[derive(Debug, Clone)]
pub struct ModelBundle {
    pub vectorizer: Arc<TfidfVectorizer>,
    pub classifier: Arc<ArtifactClassifier>,
}

impl ModelBundle {
    /// 读取并校验向量化器和分类器产物
    ///
    /// # 错误
    /// * 文件缺失或无法读取时返回 [`ModelError::Io`]
    /// * JSON 结构不符时返回 [`ModelError::Parse`]
    /// * 产物内部不一致时返回 [`ModelError::InvalidArtifact`]
    pub fn load(settings: &ModelSettings) -> Result<Self, ModelError> {
        let vectorizer_artifact: VectorizerArtifact = read_json(Path::new(&settings.vectorizer_path))?;
        let classifier_artifact: ClassifierArtifact = read_json(Path::new(&settings.classifier_path))?;

        let vectorizer = TfidfVectorizer::from_artifact(vectorizer_artifact)?;
        let classifier = ArtifactClassifier::from_artifact(classifier_artifact)?;

        info!(
            vectorizer = %settings.vectorizer_path,
            analyzer = ?vectorizer.analyzer(),
            vocabulary = vectorizer.width(),
            classifier = %settings.classifier_path,
            kind = classifier.kind(),
            "Model artifacts loaded"
        );

        Ok(Self {
            vectorizer: Arc::new(vectorizer),
            classifier: Arc::new(classifier),
        })
    }

    /// 构造词法评分器，同时完成特征宽度校验
    pub fn into_scorer(self, threshold: f64) -> Result<LexicalScorer, ModelError> {
        LexicalScorer::new(self.vectorizer, self.classifier, threshold)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ModelError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
