// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::models::{ReputationReport, SourceReport};
use crate::domain::reputation::{ReputationError, ReputationSource};

/// 信誉网关
///
/// 并发查询两个信誉源，每个源有独立超时。失败、超时或未配置都降级为
/// `Unknown` 并记录原因，一个源的失败不会影响另一个。
pub struct ReputationGateway {
    safe_browsing: Arc<dyn ReputationSource>,
    safe_browsing_timeout: Duration,
    virustotal: Arc<dyn ReputationSource>,
    virustotal_timeout: Duration,
}

impl ReputationGateway {
    pub fn new(
        safe_browsing: Arc<dyn ReputationSource>,
        safe_browsing_timeout: Duration,
        virustotal: Arc<dyn ReputationSource>,
        virustotal_timeout: Duration,
    ) -> Self {
        Self {
            safe_browsing,
            safe_browsing_timeout,
            virustotal,
            virustotal_timeout,
        }
    }

    pub async fn check_reputation(&self, url: &str) -> ReputationReport {
        let (safe_browsing, virustotal) = tokio::join!(
            run_source(self.safe_browsing.as_ref(), self.safe_browsing_timeout, url),
            run_source(self.virustotal.as_ref(), self.virustotal_timeout, url),
        );

        ReputationReport {
            safe_browsing,
            virustotal,
        }
    }
}

async fn run_source(source: &dyn ReputationSource, timeout: Duration, url: &str) -> SourceReport {
    let name = source.name();

    match tokio::time::timeout(timeout, source.check(url)).await {
        Ok(Ok(result)) => {
            info!(source = name, ?result, "Reputation check completed");
            SourceReport::new(name, result)
        }
        Ok(Err(ReputationError::NotConfigured)) => {
            debug!(source = name, "Reputation source not configured, reporting unknown");
            counter!("sentinel_signal_degraded_total", "signal" => name, "reason" => "not_configured")
                .increment(1);
            SourceReport::unknown(name, ReputationError::NotConfigured.to_string())
        }
        Ok(Err(e)) => {
            warn!(source = name, error = %e, "Reputation check failed, reporting unknown");
            counter!("sentinel_signal_degraded_total", "signal" => name, "reason" => "error")
                .increment(1);
            SourceReport::unknown(name, e.to_string())
        }
        Err(_) => {
            warn!(source = name, timeout_ms = timeout.as_millis() as u64, "Reputation check timed out, reporting unknown");
            counter!("sentinel_signal_degraded_total", "signal" => name, "reason" => "timeout")
                .increment(1);
            SourceReport::unknown(
                name,
                format!("timed out after {} ms", timeout.as_millis()),
            )
        }
    }
}
