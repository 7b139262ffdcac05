//! Prometheus exposition of the run's counters
//!
//! The CLI has no HTTP surface to scrape, so the recorder is rendered once
//! at exit when `[telemetry] print_metrics` is set.
//!
//! - `spotify_logins_total` (counter): label `outcome`
//! - `spotify_api_*` counters from the API client

use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder and return a handle for rendering.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")
}

/// Record the outcome of a login attempt (`success`, `cancelled`, `failed`).
pub fn record_login(outcome: &'static str) {
    metrics::counter!("spotify_logins_total", "outcome" => outcome).increment(1);
}
