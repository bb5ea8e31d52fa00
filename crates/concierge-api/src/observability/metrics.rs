//! Prometheus metrics.
//!
//! Uses the `metrics` facade with `metrics-exporter-prometheus` for exposition.
//!
//! # Metrics Exposed
//!
//! - `concierge_gateway_outcomes_total{class}` - Gateway outcomes by class
//! - `concierge_oracle_check_duration_seconds{status}` - Oracle check latency
//! - `concierge_http_requests_total{route,status}` - HTTP requests served
//! - `concierge_http_request_duration_seconds{route,status}` - HTTP latency

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::header::CONTENT_TYPE, response::IntoResponse};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Shared state containing the Prometheus handle for metrics rendering.
#[derive(Clone)]
pub struct MetricsState {
    handle: Arc<PrometheusHandle>,
}

impl MetricsState {
    pub fn new(handle: PrometheusHandle) -> Self {
        Self {
            handle: Arc::new(handle),
        }
    }

    /// Renders the current metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Error type for metrics initialization.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("failed to install Prometheus recorder: recorder already installed")]
    AlreadyInstalled,
}

/// Installs the global Prometheus recorder and describes the concierge metrics.
///
/// Only one recorder can be installed per process.
pub fn init_metrics() -> Result<MetricsState, MetricsError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|_| MetricsError::AlreadyInstalled)?;

    describe_metrics();

    Ok(MetricsState::new(handle))
}

fn describe_metrics() {
    metrics::describe_counter!(
        "concierge_gateway_outcomes_total",
        "Gateway outcomes by class (guidance, answer, refusal, unavailable, not_found)"
    );
    metrics::describe_histogram!(
        "concierge_oracle_check_duration_seconds",
        "Authorization oracle check duration in seconds by status"
    );
    metrics::describe_counter!(
        "concierge_http_requests_total",
        "HTTP requests served by route and status"
    );
    metrics::describe_histogram!(
        "concierge_http_request_duration_seconds",
        "HTTP request duration in seconds by route and status"
    );
}

/// Records one served request. `route` is the matched route pattern.
pub fn record_http_request(route: &str, status: u16, elapsed: Duration) {
    let labels = [
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("concierge_http_requests_total", &labels).increment(1);
    metrics::histogram!("concierge_http_request_duration_seconds", &labels)
        .record(elapsed.as_secs_f64());
}

/// Prometheus exposition format content type.
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Handler for the `/metrics` endpoint.
pub async fn metrics_handler(State(state): State<MetricsState>) -> impl IntoResponse {
    ([(CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], state.render())
}
