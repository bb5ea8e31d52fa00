//! Observability infrastructure for the concierge.
//!
//! This module provides:
//! - Prometheus metrics endpoint
//! - Structured logging configuration

mod logging;
mod metrics;

pub use logging::{init_logging, parse_level, LoggingConfig};
pub use metrics::{init_metrics, metrics_handler, record_http_request, MetricsError, MetricsState};
