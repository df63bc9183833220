//! Graph Feed Poller — Binary Entrypoint
//! Wires config, authentication, the polling engine, and the metrics server.

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use graph_feed_poller::auth::AppTokenAuthenticator;
use graph_feed_poller::config::PollerConfig;
use graph_feed_poller::metrics::Metrics;
use graph_feed_poller::poll::scheduler::{spawn_poller, SchedulerCfg};
use graph_feed_poller::poll::PollEngine;
use graph_feed_poller::sink::SinkMux;
use graph_feed_poller::transport::HttpTransport;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("graph_feed_poller=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = PollerConfig::load_default().context("loading poller config")?;

    let metrics = Metrics::init();

    let sink = SinkMux::from_config(cfg.webhook_url.as_deref());
    let mut engine = PollEngine::new(&cfg, HttpTransport::new(), sink);

    match cfg.credentials.resolved() {
        Some(creds) => {
            let auth = AppTokenAuthenticator::new(cfg.base_url.clone(), creds);
            engine.authenticate(&auth).await;
        }
        None => {
            tracing::error!("app credentials are not configured; polling will fail fast");
        }
    }

    let poller = spawn_poller(
        engine,
        SchedulerCfg {
            polling_interval_secs: cfg.polling_interval_secs,
            retry_interval_secs: cfg.retry_interval_secs,
            retry_burst: cfg.retry_burst,
        },
    );

    let listener = tokio::net::TcpListener::bind(&cfg.metrics_addr)
        .await
        .with_context(|| format!("binding {}", cfg.metrics_addr))?;
    tracing::info!(addr = %cfg.metrics_addr, "serving metrics");
    let app = metrics.router();

    tokio::select! {
        res = async move { axum::serve(listener, app).await } => res.context("metrics server")?,
        res = poller => res.context("poller task")?,
    }
    Ok(())
}
