// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Deserialize;

use crate::domain::scoring::{ModelError, ProbabilityClassifier};

/// 决策树节点
///
/// `Split` 在 `x[feature] <= threshold` 时走左子树，否则走右子树。
/// 子节点下标必须大于当前节点，保证遍历必然终止。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::InvalidArtifact("decision tree has no nodes".into()));
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(ModelError::InvalidArtifact(format!(
                            "node {} splits on feature {} but the model has {} features",
                            index, feature, n_features
                        )));
                    }
                    if threshold.is_nan() {
                        return Err(ModelError::InvalidArtifact(format!(
                            "node {} has a NaN threshold",
                            index
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(ModelError::InvalidArtifact(format!(
                                "node {} points to invalid child {}",
                                index, child
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(ModelError::InvalidArtifact(format!(
                            "leaf {} has non-finite value",
                            index
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn leaves(&self) -> impl Iterator<Item = f64> + '_ {
        self.nodes.iter().filter_map(|node| match node {
            TreeNode::Leaf { value } => Some(*value),
            TreeNode::Split { .. } => None,
        })
    }

    fn evaluate(&self, features: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                TreeNode::Leaf { value } => return *value,
            }
        }
    }
}

/// 分类器的序列化形式，按 `kind` 区分
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    /// `sigmoid(w·x + b)`
    Logistic {
        n_features: usize,
        weights: Vec<f64>,
        intercept: f64,
    },
    /// 各树叶子为恶意概率，结果取均值
    Forest {
        n_features: usize,
        trees: Vec<DecisionTree>,
    },
    /// 各树叶子为 margin，结果为 `sigmoid(base_score + Σ)`
    GradientBoosted {
        n_features: usize,
        #[serde(default)]
        base_score: f64,
        trees: Vec<DecisionTree>,
    },
}

impl ClassifierArtifact {
    pub fn n_features(&self) -> usize {
        match self {
            ClassifierArtifact::Logistic { n_features, .. }
            | ClassifierArtifact::Forest { n_features, .. }
            | ClassifierArtifact::GradientBoosted { n_features, .. } => *n_features,
        }
    }
}

/// 从训练产物加载并校验过的分类器
#[derive(Debug, Clone)]
pub struct ArtifactClassifier {
    model: ClassifierArtifact,
}

impl ArtifactClassifier {
    pub fn from_artifact(model: ClassifierArtifact) -> Result<Self, ModelError> {
        let n_features = model.n_features();
        if n_features == 0 {
            return Err(ModelError::InvalidArtifact("classifier declares zero features".into()));
        }

        match &model {
            ClassifierArtifact::Logistic {
                weights, intercept, ..
            } => {
                if weights.len() != n_features {
                    return Err(ModelError::InvalidArtifact(format!(
                        "logistic model has {} weights but declares {} features",
                        weights.len(),
                        n_features
                    )));
                }
                if !intercept.is_finite() || weights.iter().any(|w| !w.is_finite()) {
                    return Err(ModelError::InvalidArtifact(
                        "logistic model has non-finite coefficients".into(),
                    ));
                }
            }
            ClassifierArtifact::Forest { trees, .. } => {
                validate_trees(trees, n_features)?;
                if trees
                    .iter()
                    .flat_map(|t| t.leaves())
                    .any(|v| !(0.0..=1.0).contains(&v))
                {
                    return Err(ModelError::InvalidArtifact(
                        "forest leaf probabilities must lie in [0, 1]".into(),
                    ));
                }
            }
            ClassifierArtifact::GradientBoosted {
                trees, base_score, ..
            } => {
                validate_trees(trees, n_features)?;
                if !base_score.is_finite() {
                    return Err(ModelError::InvalidArtifact(
                        "gradient boosted base_score is not finite".into(),
                    ));
                }
            }
        }

        Ok(Self { model })
    }

    pub fn kind(&self) -> &'static str {
        match self.model {
            ClassifierArtifact::Logistic { .. } => "logistic",
            ClassifierArtifact::Forest { .. } => "forest",
            ClassifierArtifact::GradientBoosted { .. } => "gradient_boosted",
        }
    }
}

fn validate_trees(trees: &[DecisionTree], n_features: usize) -> Result<(), ModelError> {
    if trees.is_empty() {
        return Err(ModelError::InvalidArtifact("tree ensemble has no trees".into()));
    }
    trees.iter().try_for_each(|tree| tree.validate(n_features))
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl ProbabilityClassifier for ArtifactClassifier {
    fn n_features(&self) -> usize {
        self.model.n_features()
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.n_features() {
            return Err(ModelError::Prediction(format!(
                "expected {} features, got {}",
                self.n_features(),
                features.len()
            )));
        }

        let probability = match &self.model {
            ClassifierArtifact::Logistic {
                weights, intercept, ..
            } => {
                let z: f64 = weights.iter().zip(features).map(|(w, x)| w * x).sum();
                sigmoid(z + intercept)
            }
            ClassifierArtifact::Forest { trees, .. } => {
                let sum: f64 = trees.iter().map(|t| t.evaluate(features)).sum();
                sum / trees.len() as f64
            }
            ClassifierArtifact::GradientBoosted {
                base_score, trees, ..
            } => {
                let margin: f64 = trees.iter().map(|t| t.evaluate(features)).sum();
                sigmoid(base_score + margin)
            }
        };

        Ok(probability)
    }
}
