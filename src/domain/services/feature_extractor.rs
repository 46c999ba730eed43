// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::models::{FeatureVector, FEATURE_COUNT};

static HTTP_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?").expect("valid regex"));
static IPV4_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.\d+\.\d+\.\d+").expect("valid regex"));

/// URL 特征提取器
///
/// 纯函数，不做 I/O，永不失败。列顺序必须与分类器训练时一致：
///
/// | 列 | 含义 |
/// |----|------|
/// | 0 | 字符串长度（字符数） |
/// | 1 | `.` 的个数 |
/// | 2 | `-` 的个数 |
/// | 3 | `@` 的个数 |
/// | 4 | `?` 的个数 |
/// | 5 | `=` 的个数 |
/// | 6 | 是否出现 `http`/`https`（任意位置） |
/// | 7 | 是否出现点分四段数字（类 IPv4） |
/// | 8 | authority 部分中 `.` 的个数 |
/// | 9 | authority 部分的长度 |
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, url: &str) -> FeatureVector {
        let host = authority(url);

        let mut values = [0.0; FEATURE_COUNT];
        values[0] = url.chars().count() as f64;
        values[1] = count_char(url, '.');
        values[2] = count_char(url, '-');
        values[3] = count_char(url, '@');
        values[4] = count_char(url, '?');
        values[5] = count_char(url, '=');
        values[6] = flag(HTTP_TOKEN.is_match(url));
        values[7] = flag(IPV4_PATTERN.is_match(url));
        values[8] = count_char(host, '.');
        values[9] = host.chars().count() as f64;

        FeatureVector::new(values)
    }
}

fn count_char(text: &str, needle: char) -> f64 {
    text.chars().filter(|c| *c == needle).count() as f64
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Best-effort authority (netloc) extraction without normalization.
///
/// Splits off a leading `scheme:` when the prefix is a valid scheme, then takes
/// everything after `//` up to the first `/`, `?` or `#`. Userinfo and port stay
/// in. Anything that does not look like `[scheme:]//authority` yields `""`.
pub(crate) fn authority(url: &str) -> &str {
    let rest = match url.find(':') {
        Some(idx) if is_scheme(&url[..idx]) => &url[idx + 1..],
        _ => url,
    };

    match rest.strip_prefix("//") {
        Some(after) => {
            let end = after.find(['/', '?', '#']).unwrap_or(after.len());
            &after[..end]
        }
        None => "",
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}
