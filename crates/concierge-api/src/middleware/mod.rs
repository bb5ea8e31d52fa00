//! API middleware.
//!
//! Includes:
//! - Request id propagation and access logging
//! - Request counting and latency metrics
//! - CORS configuration

mod metrics;
mod request_trace;

pub use metrics::{HttpMetricsLayer, HttpMetricsService, UNMATCHED_ROUTE};
pub use request_trace::{RequestTraceLayer, RequestTraceService, REQUEST_ID_HEADER};

use tower_http::cors::{Any, CorsLayer};

/// Permissive CORS for the browser chat client.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any)
}
