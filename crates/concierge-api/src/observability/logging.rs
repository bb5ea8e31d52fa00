//! Structured logging setup.
//!
//! Gateway decisions carry `subject`, `relation`, `object` and `outcome`
//! fields. With JSON output enabled a decision looks like:
//!
//! ```json
//! {"timestamp":"2024-07-09T10:30:00.000Z","level":"INFO","target":"concierge_server::handlers::gateway::handler","fields":{"message":"Authorization decision","subject":"user:user_123","relation":"owner","object":"profile:user_123","outcome":"allowed"}}
//! ```

use concierge_server::config::LoggingSettings;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logging output selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// One JSON object per line instead of pretty text.
    pub json_format: bool,
    /// Level used when `RUST_LOG` is not set.
    pub default_level: Level,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json_format: false,
            default_level: Level::INFO,
        }
    }
}

impl LoggingConfig {
    /// Builds the logging configuration from the `logging` config section.
    pub fn from_settings(settings: &LoggingSettings) -> Self {
        Self {
            json_format: settings.json,
            default_level: parse_level(&settings.level),
        }
    }
}

/// Parses a configured level name, falling back to INFO.
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
///
/// Only the first call in a process takes effect.
pub fn init_logging(config: LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_level.to_string()));

    // The http_request span carries the request id into every JSON line
    let output = if config.json_format {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_file(false)
            .with_line_number(false)
            .boxed()
    } else {
        fmt::layer().pretty().with_target(true).boxed()
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .try_init();
}
