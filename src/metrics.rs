use axum::{routing::get, Router};
use metrics::{describe_counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and expose a static gauge for the cache TTL.
    pub fn init(ttl_secs: u64) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;

        describe_counter!("rewrite_calls_total", "Rewrite requests sent to the model API.");
        describe_counter!(
            "rewrite_failures_total",
            "Rewrites that degraded to the unavailable marker."
        );
        describe_counter!("cache_hits_total", "Fresh cache lookups.");
        describe_counter!("cache_misses_total", "Absent or expired cache lookups.");
        describe_counter!("cache_stores_total", "Rewrite results written to the cache.");
        describe_counter!(
            "inflight_joined_total",
            "Callers that awaited an already running rewrite."
        );

        // Absolute TTL, no sliding refresh
        gauge!("content_cache_ttl_secs").set(ttl_secs as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
