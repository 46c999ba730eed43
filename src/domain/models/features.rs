// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;

/// 数值特征的个数，分类器训练时的列顺序与 [`FEATURE_NAMES`] 一致
pub const FEATURE_COUNT: usize = 10;

/// 特征名称，顺序即组合向量中的列顺序（0..=9）
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "url_length",
    "dot_count",
    "hyphen_count",
    "at_count",
    "question_count",
    "equals_count",
    "has_http_token",
    "has_ipv4_pattern",
    "host_dot_count",
    "host_length",
];

/// 定长数值特征向量
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// 按名称读取特征值
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|candidate| *candidate == name)
            .map(|idx| self.0[idx])
    }
}
