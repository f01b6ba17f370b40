use anyhow::Context;
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder. Call once per process.
    pub fn init(fresh_window_ms: u64) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        describe_counter!("relay_requests_total", "Relay requests by endpoint.");
        describe_counter!(
            "relay_upstream_errors_total",
            "Relay requests that ended in an error response."
        );
        describe_histogram!("upstream_fetch_ms", "Upstream round-trip time in milliseconds.");
        describe_counter!(
            "intl_metals_cache_served_total",
            "Intl metals responses served from the snapshot cache."
        );
        describe_counter!(
            "intl_metals_rate_limited_total",
            "Commodities pages that came back too short to scrape."
        );
        describe_counter!(
            "intl_metals_scrape_misses_total",
            "Commodity labels missing from the scraped page."
        );
        describe_gauge!("intl_metals_fresh_window_ms", "Freshness window of the cache.");

        gauge!("intl_metals_fresh_window_ms").set(fresh_window_ms as f64);

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
