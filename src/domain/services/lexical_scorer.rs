// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tracing::debug;

use crate::domain::models::{LexicalScore, FEATURE_COUNT};
use crate::domain::scoring::{ModelError, ProbabilityClassifier, TextVectorizer};
use crate::domain::services::feature_extractor::FeatureExtractor;

/// 词法评分器
///
/// 组合向量布局：列 `0..FEATURE_COUNT` 是 [`FeatureExtractor`] 的数值特征，
/// 列 `FEATURE_COUNT..` 是向量化器输出（按词表列号）。
///
/// 构造时校验宽度，不一致直接返回 [`ModelError::WidthMismatch`]，
/// 调用方应终止启动。构造完成后只读，可在请求间共享。
pub struct LexicalScorer {
    extractor: FeatureExtractor,
    vectorizer: Arc<dyn TextVectorizer>,
    classifier: Arc<dyn ProbabilityClassifier>,
    threshold: f64,
}

impl LexicalScorer {
    pub fn new(
        vectorizer: Arc<dyn TextVectorizer>,
        classifier: Arc<dyn ProbabilityClassifier>,
        threshold: f64,
    ) -> Result<Self, ModelError> {
        let actual = FEATURE_COUNT + vectorizer.width();
        let expected = classifier.n_features();
        if expected != actual {
            return Err(ModelError::WidthMismatch { expected, actual });
        }
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ModelError::InvalidArtifact(format!(
                "decision threshold {} is outside [0, 1]",
                threshold
            )));
        }

        Ok(Self {
            extractor: FeatureExtractor::new(),
            vectorizer,
            classifier,
            threshold,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn width(&self) -> usize {
        FEATURE_COUNT + self.vectorizer.width()
    }

    /// 计算单个 URL 的恶意概率
    ///
    /// 向量化或预测失败、概率不在 `[0, 1]` 内时返回错误，由上层降级。
    pub fn score(&self, url: &str) -> Result<LexicalScore, ModelError> {
        let combined = self.combine(url)?;
        let probability = self.classifier.predict_proba(&combined)?;

        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(ModelError::Prediction(format!(
                "classifier returned probability {} outside [0, 1]",
                probability
            )));
        }

        debug!(probability, threshold = self.threshold, "Lexical score computed");
        Ok(LexicalScore::from_probability(probability, self.threshold))
    }

    fn combine(&self, url: &str) -> Result<Vec<f64>, ModelError> {
        let numeric = self.extractor.extract(url);
        let text = self.vectorizer.transform(url)?;

        if text.width != self.vectorizer.width() {
            return Err(ModelError::Transform(format!(
                "vectorizer produced width {}, expected {}",
                text.width,
                self.vectorizer.width()
            )));
        }

        let mut combined = vec![0.0; self.width()];
        combined[..FEATURE_COUNT].copy_from_slice(numeric.as_slice());
        for (column, value) in text.entries {
            let slot = combined.get_mut(FEATURE_COUNT + column).ok_or_else(|| {
                ModelError::Transform(format!("vectorizer column {} out of range", column))
            })?;
            *slot = value;
        }
        Ok(combined)
    }
}
