// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

use crate::domain::scoring::{ModelError, SparseVector, TextVectorizer};

const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

static MULTI_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s\s+").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Analyzer {
    Word,
    Char,
    CharWb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Norm {
    L1,
    L2,
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

fn default_true() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// 向量化器的序列化形式，由训练流程导出
#[derive(Debug, Clone, Deserialize)]
pub struct VectorizerArtifact {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    pub analyzer: Analyzer,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
    #[serde(default)]
    pub sublinear_tf: bool,
}

/// TF-IDF 向量化器
///
/// 语义与训练端一致：统计词表内 n-gram 的出现次数，乘以 idf，
/// 可选 `1 + ln(tf)`，最后按 `norm` 归一化。
#[derive(Debug)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    analyzer: Analyzer,
    ngram_range: (usize, usize),
    lowercase: bool,
    token_pattern: Regex,
    norm: Option<Norm>,
    sublinear_tf: bool,
}

impl TfidfVectorizer {
    pub fn from_artifact(artifact: VectorizerArtifact) -> Result<Self, ModelError> {
        let width = artifact.vocabulary.len();
        if width == 0 {
            return Err(ModelError::InvalidArtifact("vectorizer vocabulary is empty".into()));
        }
        if artifact.idf.len() != width {
            return Err(ModelError::InvalidArtifact(format!(
                "vectorizer idf has {} entries but vocabulary has {}",
                artifact.idf.len(),
                width
            )));
        }
        if let Some(bad) = artifact.idf.iter().find(|w| !w.is_finite()) {
            return Err(ModelError::InvalidArtifact(format!(
                "vectorizer idf contains non-finite weight {}",
                bad
            )));
        }

        let mut seen = vec![false; width];
        for (term, &column) in &artifact.vocabulary {
            if column >= width {
                return Err(ModelError::InvalidArtifact(format!(
                    "vocabulary term {:?} maps to column {} outside width {}",
                    term, column, width
                )));
            }
            if seen[column] {
                return Err(ModelError::InvalidArtifact(format!(
                    "vocabulary column {} is assigned twice",
                    column
                )));
            }
            seen[column] = true;
        }

        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ModelError::InvalidArtifact(format!(
                "invalid ngram_range ({}, {})",
                min_n, max_n
            )));
        }

        let token_pattern = Regex::new(&artifact.token_pattern).map_err(|e| {
            ModelError::InvalidArtifact(format!("invalid token_pattern: {}", e))
        })?;

        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            analyzer: artifact.analyzer,
            ngram_range: artifact.ngram_range,
            lowercase: artifact.lowercase,
            token_pattern,
            norm: artifact.norm,
            sublinear_tf: artifact.sublinear_tf,
        })
    }

    pub fn analyzer(&self) -> Analyzer {
        self.analyzer
    }

    fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        match self.analyzer {
            Analyzer::Word => self.word_ngrams(&text),
            Analyzer::Char => self.char_ngrams(&text),
            Analyzer::CharWb => self.char_wb_ngrams(&text),
        }
    }

    fn word_ngrams(&self, text: &str) -> Vec<String> {
        let tokens: Vec<&str> = self
            .token_pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
            .map(|m| m.as_str())
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut grams = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                grams.push(window.join(" "));
            }
        }
        grams
    }

    fn char_ngrams(&self, text: &str) -> Vec<String> {
        let normalized = MULTI_WHITESPACE.replace_all(text, " ");
        let chars: Vec<char> = normalized.chars().collect();

        let (min_n, max_n) = self.ngram_range;
        let mut grams = Vec::new();
        for n in min_n..=max_n.min(chars.len()) {
            for window in chars.windows(n) {
                grams.push(window.iter().collect());
            }
        }
        grams
    }

    /// 只在词内取 n-gram，词两端补一个空格；短于 n 的词整体计一次
    fn char_wb_ngrams(&self, text: &str) -> Vec<String> {
        let normalized = MULTI_WHITESPACE.replace_all(text, " ");
        let (min_n, max_n) = self.ngram_range;
        let mut grams = Vec::new();

        for word in normalized.split_whitespace() {
            let padded: Vec<char> = std::iter::once(' ')
                .chain(word.chars())
                .chain(std::iter::once(' '))
                .collect();
            let len = padded.len();

            for n in min_n..=max_n {
                let mut offset = 0;
                grams.push(padded[offset..(offset + n).min(len)].iter().collect());
                while offset + n < len {
                    offset += 1;
                    grams.push(padded[offset..offset + n].iter().collect());
                }
                if offset == 0 {
                    break;
                }
            }
        }
        grams
    }
}

impl TextVectorizer for TfidfVectorizer {
    fn width(&self) -> usize {
        self.vocabulary.len()
    }

    fn transform(&self, text: &str) -> Result<SparseVector, ModelError> {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for gram in self.analyze(text) {
            if let Some(&column) = self.vocabulary.get(&gram) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(column, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (column, tf * self.idf[column])
            })
            .collect();

        let scale = match self.norm {
            Some(Norm::L2) => entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
            Some(Norm::L1) => entries.iter().map(|(_, v)| v.abs()).sum::<f64>(),
            None => 1.0,
        };
        if scale > 0.0 && scale != 1.0 {
            for (_, value) in entries.iter_mut() {
                *value /= scale;
            }
        }

        if let Some((column, value)) = entries.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ModelError::Transform(format!(
                "non-finite weight {} at column {}",
                value, column
            )));
        }

        Ok(SparseVector::new(self.width(), entries))
    }
}
