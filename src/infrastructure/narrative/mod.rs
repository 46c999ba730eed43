// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 生成式文本提供方实现
///
/// - OpenAI 兼容接口（openai）：主提供方
/// - Gemini（gemini）：主提供方配额耗尽时的备用提供方
pub mod gemini;
pub mod openai;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

use crate::domain::narrative::NarrativeError;

pub(crate) fn transport_error(e: reqwest::Error) -> NarrativeError {
    if e.is_timeout() {
        NarrativeError::Timeout
    } else {
        NarrativeError::NetworkError(e.to_string())
    }
}
