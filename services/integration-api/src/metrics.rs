//! Prometheus metrics exposition
//!
//! - `integration_requests_total` (counter): labels `route`, `status`
//! - `integration_request_duration_seconds` (histogram): label `route`
//! - `integration_upstream_errors_total` (counter): label `operation`, recorded by hubspot-items
//! - `integration_token_refresh_total` (counter): label `outcome`, recorded by hubspot-auth

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

/// Bucket boundaries from 5ms to 30s; the upper end covers three sequential
/// HubSpot list calls at the default timeout.
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

fn builder() -> PrometheusBuilder {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("integration_request_duration_seconds".to_string()),
            DURATION_BUCKETS,
        )
        .expect("histogram buckets are non-empty")
}

/// Install the global Prometheus recorder and return a handle for rendering.
pub fn install_recorder() -> PrometheusHandle {
    builder()
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

/// Record a handled request with its route and final status code.
pub fn record_request(route: &'static str, status: u16, duration_secs: f64) {
    metrics::counter!("integration_requests_total", "route" => route, "status" => status.to_string())
        .increment(1);
    metrics::histogram!("integration_request_duration_seconds", "route" => route)
        .record(duration_secs);
}
