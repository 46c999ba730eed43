// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use tracing::info;

/// 初始化指标系统
///
/// 安装 Prometheus recorder 并在 `listen_addr` 上暴露抓取端点，
/// 随后注册应用所需的各类监控指标。需要在 Tokio 运行时内调用。
pub fn init_metrics(listen_addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(listen_addr)
        .install()?;

    info!(%listen_addr, "Prometheus exporter listening");
    describe_metrics();
    Ok(())
}

/// 注册指标描述
pub fn describe_metrics() {
    describe_counter!(
        "sentinel_verdicts_total",
        "Total number of verdicts produced, labelled by outcome"
    );
    describe_counter!(
        "sentinel_signal_degraded_total",
        "Total number of signals degraded to unknown or unavailable, labelled by signal and reason"
    );
    describe_counter!(
        "sentinel_narrative_provenance_total",
        "Total number of narratives by provenance (primary, fallback, none)"
    );
    describe_histogram!(
        "sentinel_analysis_duration_seconds",
        Unit::Seconds,
        "End-to-end duration of a URL analysis in seconds"
    );
}
