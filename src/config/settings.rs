// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::{Config, ConfigError, Environment, File, Map};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

use crate::domain::models::DecisionPolicy;

/// 环境变量前缀，例如 `SENTINELRS__SERVER__PORT`
pub const ENV_PREFIX: &str = "SENTINELRS";

/// 应用程序配置设置
///
/// 包含服务器、模型产物、判定策略、信誉源、叙述提供方和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 模型产物配置
    pub model: ModelSettings,
    /// 判定策略配置
    pub policy: PolicySettings,
    /// Google Safe Browsing 配置
    pub safe_browsing: SafeBrowsingSettings,
    /// VirusTotal 配置
    pub virustotal: VirusTotalSettings,
    /// 叙述分析配置
    pub narrative: NarrativeSettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 模型产物配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    /// 向量化器 JSON 产物路径
    pub vectorizer_path: String,
    /// 分类器 JSON 产物路径
    pub classifier_path: String,
}

/// 判定策略配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct PolicySettings {
    /// 词法判定阈值（包含）
    pub decision_threshold: f64,
    /// 含糊叙述覆盖规则的阈值，未设置时与判定阈值相同
    pub vague_override_threshold: Option<f64>,
}

impl PolicySettings {
    pub fn decision_policy(&self) -> DecisionPolicy {
        let policy = DecisionPolicy::new(self.decision_threshold);
        match self.vague_override_threshold {
            Some(threshold) => policy.with_vague_override_threshold(threshold),
            None => policy,
        }
    }
}

fn default_threat_types() -> Vec<String> {
    [
        "MALWARE",
        "SOCIAL_ENGINEERING",
        "UNWANTED_SOFTWARE",
        "POTENTIALLY_HARMFUL_APPLICATION",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Google Safe Browsing 配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SafeBrowsingSettings {
    /// API 密钥，未设置时该信誉源报告 Unknown
    pub api_key: Option<String>,
    /// API 基础 URL
    pub base_url: String,
    /// 上报给服务端的客户端标识
    pub client_id: String,
    /// 请求超时（毫秒）
    pub timeout_ms: u64,
    /// 查询的威胁类型
    #[serde(default = "default_threat_types")]
    pub threat_types: Vec<String>,
}

impl SafeBrowsingSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// VirusTotal 配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct VirusTotalSettings {
    /// API 密钥，未设置时该信誉源报告 Unknown
    pub api_key: Option<String>,
    /// API 基础 URL（含 `/api/v3`）
    pub base_url: String,
    /// 整个两步查询的超时（毫秒）
    pub timeout_ms: u64,
    /// 分析未完成时的最大轮询次数
    pub poll_attempts: u32,
    /// 两次轮询之间的间隔（毫秒）
    pub poll_interval_ms: u64,
}

impl VirusTotalSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// 单个生成式提供方的配置
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    /// API 密钥
    pub api_key: Option<String>,
    /// API 基础 URL
    pub base_url: String,
    /// 模型名称
    pub model: String,
    /// 请求超时（毫秒）
    pub timeout_ms: u64,
}

impl ProviderSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// 叙述分析配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct NarrativeSettings {
    /// 最短有效叙述长度（字符数）
    pub min_length: usize,
    /// 主提供方（OpenAI 兼容接口）
    pub primary: ProviderSettings,
    /// 备用提供方（Gemini）
    pub fallback: ProviderSettings,
}

/// 指标导出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 导出监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加：代码内默认值、`config/default`、`config/{APP_ENVIRONMENT}`、
    /// `SENTINELRS__*` 环境变量，最后用旧版的无前缀变量补齐未设置的密钥。
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载并通过校验的配置
    /// * `Err(ConfigError)` - 配置加载或校验失败
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_env(std::env::vars().collect())
    }

    /// 使用给定的环境变量集合加载配置
    pub fn from_env(vars: Map<String, String>) -> Result<Self, ConfigError> {
        let env = vars
            .get("APP_ENVIRONMENT")
            .cloned()
            .unwrap_or_else(|| "default".to_string());

        // Plain PORT only applies when the prefixed variable is absent
        let prefixed_port = format!("{}__SERVER__PORT", ENV_PREFIX);
        let legacy_port = if vars.contains_key(&prefixed_port) {
            None
        } else {
            non_empty(vars.get("PORT").cloned())
        };

        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("model.vectorizer_path", "models/vectorizer.json")?
            .set_default("model.classifier_path", "models/classifier.json")?
            .set_default("policy.decision_threshold", 0.9)?
            .set_default(
                "safe_browsing.base_url",
                "https://safebrowsing.googleapis.com",
            )?
            .set_default("safe_browsing.client_id", "sentinelrs")?
            .set_default("safe_browsing.timeout_ms", 5000)?
            .set_default("virustotal.base_url", "https://www.virustotal.com/api/v3")?
            .set_default("virustotal.timeout_ms", 15000)?
            .set_default("virustotal.poll_attempts", 3)?
            .set_default("virustotal.poll_interval_ms", 2000)?
            .set_default("narrative.min_length", 80)?
            .set_default("narrative.primary.base_url", "https://api.openai.com/v1")?
            .set_default("narrative.primary.model", "gpt-3.5-turbo")?
            .set_default("narrative.primary.timeout_ms", 20000)?
            .set_default(
                "narrative.fallback.base_url",
                "https://generativelanguage.googleapis.com",
            )?
            .set_default("narrative.fallback.model", "gemini-1.5-flash")?
            .set_default("narrative.fallback.timeout_ms", 20000)?
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .set_override_option("server.port", legacy_port)?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(vars.clone())),
            );

        let mut settings: Settings = builder.build()?.try_deserialize()?;
        settings.fill_missing(|key| vars.get(key).cloned());
        settings.validate()?;
        Ok(settings)
    }

    /// 用旧版无前缀环境变量补齐未设置的 API 密钥
    pub fn fill_missing(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let slots = [
            (&mut self.safe_browsing.api_key, "GOOGLE_API_KEY"),
            (&mut self.virustotal.api_key, "VT_API_KEY"),
            (&mut self.narrative.primary.api_key, "OPENAI_API_KEY"),
            (&mut self.narrative.fallback.api_key, "GEMINI_API_KEY"),
        ];

        for (slot, key) in slots {
            if non_empty(slot.clone()).is_none() {
                *slot = non_empty(lookup(key));
            }
        }
    }

    /// 校验配置取值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("policy.decision_threshold", Some(self.policy.decision_threshold)),
            (
                "policy.vague_override_threshold",
                self.policy.vague_override_threshold,
            ),
        ] {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(ConfigError::Message(format!(
                        "{} must be within [0, 1], got {}",
                        name, v
                    )));
                }
            }
        }

        for (name, value) in [
            ("safe_browsing.timeout_ms", self.safe_browsing.timeout_ms),
            ("virustotal.timeout_ms", self.virustotal.timeout_ms),
            ("narrative.primary.timeout_ms", self.narrative.primary.timeout_ms),
            ("narrative.fallback.timeout_ms", self.narrative.fallback.timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Message(format!("{} must be greater than 0", name)));
            }
        }

        if self.virustotal.poll_attempts == 0 {
            return Err(ConfigError::Message(
                "virustotal.poll_attempts must be at least 1".to_string(),
            ));
        }

        for (name, value) in [
            ("safe_browsing.base_url", &self.safe_browsing.base_url),
            ("virustotal.base_url", &self.virustotal.base_url),
            ("narrative.primary.base_url", &self.narrative.primary.base_url),
            ("narrative.fallback.base_url", &self.narrative.fallback.base_url),
        ] {
            Url::parse(value).map_err(|e| {
                ConfigError::Message(format!("{} is not a valid URL ({}): {}", name, value, e))
            })?;
        }

        if self.metrics.enabled && self.metrics.listen_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Message(format!(
                "metrics.listen_addr is not a socket address: {}",
                self.metrics.listen_addr
            )));
        }

        Ok(())
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
