// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 外部信誉源实现
///
/// - Google Safe Browsing（safe_browsing）：威胁列表匹配
/// - VirusTotal（virustotal）：提交 URL 后轮询多引擎扫描结果
pub mod safe_browsing;
pub mod virustotal;

pub use safe_browsing::SafeBrowsingClient;
pub use virustotal::VirusTotalClient;

use crate::domain::reputation::ReputationError;

pub(crate) fn transport_error(e: reqwest::Error) -> ReputationError {
    if e.is_timeout() {
        ReputationError::Timeout
    } else {
        ReputationError::NetworkError(e.to_string())
    }
}
