//! Purple digest service — binary entrypoint.
//! Loads config, wires the orchestrator, and serves the HTTP API plus `/metrics`.

use std::time::Duration;

use purple_digest::{bootstrap, create_router, metrics::Metrics, AppConfig};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default, JSON lines when `LOG_FORMAT=json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("purple_digest=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // The runtime may already have installed a subscriber; keep it in that case.
    let _ = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::load().map_err(shuttle_runtime::Error::Custom)?;
    tracing::info!(
        rewrite_mode = ?cfg.rewrite_mode,
        openai_key_len = cfg.openai.api_key.len(),
        news_key_len = cfg.news.api_key.len(),
        "config loaded"
    );

    let metrics = Metrics::init(cfg.cache.ttl_secs).map_err(shuttle_runtime::Error::Custom)?;

    let orchestrator = bootstrap(&cfg).await;
    orchestrator.spawn_sweeper(Duration::from_secs(cfg.cache.ttl_secs.clamp(60, 3600)));

    let router = create_router(orchestrator).merge(metrics.router());
    Ok(router.into())
}
