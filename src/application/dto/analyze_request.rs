// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::models::{EmptyUrlError, UrlRecord};

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct AnalyzeRequestDto {
    #[validate(required(message = "No URL provided"), length(min = 1, message = "No URL provided"))]
    pub url: Option<String>,
}

impl AnalyzeRequestDto {
    /// 转为领域输入，缺失或纯空白的 URL 一律拒绝
    pub fn into_record(self) -> Result<UrlRecord, EmptyUrlError> {
        UrlRecord::new(self.url.ok_or(EmptyUrlError)?)
    }
}
