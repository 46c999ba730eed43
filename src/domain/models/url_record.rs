// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("No URL provided")]
pub struct EmptyUrlError;

/// 待评估的 URL
///
/// 内容是不透明的文本，不做 URI 合法性校验；唯一的约束是非空
/// （纯空白也视为空）。原始文本保持不变，用于回显和特征提取。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord(String);

impl UrlRecord {
    pub fn new(raw: impl Into<String>) -> Result<Self, EmptyUrlError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(EmptyUrlError);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for UrlRecord {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UrlRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
