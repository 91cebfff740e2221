//! techaudit-proxy: runs PageSpeed Insights audits on behalf of the TechAudit
//! dashboard and returns a simplified report.

mod audit;
mod config;
mod error;
mod pagespeed;
mod request_id;
mod server;
mod strategy;

#[cfg(test)]
mod test_support;

use std::time::Duration;

use audit::AuditProxy;
use config::ProxyConfig;
use server::AppState;

fn main() -> anyhow::Result<()> {
    // Parse CLI args
    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1).cloned())
        .or_else(|| args.get(1).filter(|a| !a.starts_with('-')).cloned())
        .or_else(|| std::env::var("TECHAUDIT_CONFIG").ok())
        .unwrap_or_else(|| "techaudit.toml".to_string());

    let config = ProxyConfig::load(&config_path)?;

    // Build the tokio runtime first, the tonic gRPC exporter needs a reactor context
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let _tracing_guard = techaudit_tracing::init_tracing(&config.tracing);

        tracing::info!(
            config_path = %config_path,
            listen_address = %config.server.listen_address,
            upstream = %config.upstream.base_url,
            static_dir = %config.server.static_dir,
            "Starting techaudit-proxy"
        );
        config.warn_missing_credentials();

        run(config).await
    })
}

async fn run(config: ProxyConfig) -> anyhow::Result<()> {
    let upstream_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.upstream.timeout_secs))
        .build()?;

    let audit = AuditProxy::new(upstream_client, &config);
    let state = AppState { config, audit };

    server::run(state).await
}
