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

use anyhow::Context;
use sentinelrs::config::settings::Settings;
use sentinelrs::infrastructure::factory;
use sentinelrs::infrastructure::model::ModelBundle;
use sentinelrs::infrastructure::observability::metrics;
use sentinelrs::presentation::routes;
use sentinelrs::utils::telemetry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env may carry RUST_LOG, so it is read before the subscriber exists
    let dotenv = dotenvy::dotenv();

    // 1. Initialize logging
    telemetry::init_telemetry(telemetry::LogFormat::from_env());
    info!("Starting sentinelrs...");

    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!("Failed to load .env file: {}", e);
        }
    }

    // 2. Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;
    info!("Configuration loaded");

    // 3. Initialize Prometheus Metrics
    if settings.metrics.enabled {
        let addr: SocketAddr = settings
            .metrics
            .listen_addr
            .parse()
            .context("Invalid metrics listen address")?;
        metrics::init_metrics(addr).context("Failed to install Prometheus exporter")?;
    }

    // 4. Load model artifacts; any failure here aborts startup
    let scorer = ModelBundle::load(&settings.model)
        .and_then(|bundle| bundle.into_scorer(settings.policy.decision_threshold))
        .context("Failed to load lexical model")?;
    info!(width = scorer.width(), "Lexical scorer ready");

    // 5. Build the threat service
    let service = Arc::new(factory::build_threat_service(&settings, scorer));

    // 6. Start HTTP server
    let app = routes::routes(service);

    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
