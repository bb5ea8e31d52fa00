//! Configuration management for the concierge server.
//!
//! This module provides configuration loading with multiple sources:
//! 1. Default values (hardcoded)
//! 2. Configuration file (YAML)
//! 3. Environment variables (override)
//!
//! # Configuration Hierarchy
//!
//! Environment variables take precedence over config file values,
//! which take precedence over defaults.
//!
//! # Example
//!
//! ```ignore
//! use concierge_server::config::ServerConfig;
//!
//! // Load from file with env overrides
//! let config = ServerConfig::load("config.yaml")?;
//!
//! // Or load from environment only
//! let config = ServerConfig::from_env()?;
//! ```

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// Environment variable prefix (`CONCIERGE_SERVER__PORT`, `CONCIERGE_ORACLE__STORE_ID`, ...).
pub const ENV_PREFIX: &str = "CONCIERGE";

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    /// Server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Record storage settings
    #[serde(default)]
    pub storage: StorageSettings,

    /// Authorization oracle settings
    #[serde(default)]
    pub oracle: OracleSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Metrics settings
    #[serde(default)]
    pub metrics: MetricsSettings,
}

/// Server network settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerSettings {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    6060
}

/// Record storage settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StorageSettings {
    /// Storage backend type: "memory" or "json"
    #[serde(default = "default_storage_backend")]
    pub backend: String,

    /// Path of the profile file (required if backend is "json")
    pub data_path: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            data_path: None,
        }
    }
}

fn default_storage_backend() -> String {
    "memory".to_string()
}

/// Authorization oracle settings.
///
/// The oracle is considered configured when `api_url` and `store_id` are set.
/// Client credentials are optional; when `client_id` is set, `client_secret`
/// and `api_token_issuer` must be set too. Anything less leaves the server
/// running with every profile request failing closed.
///
/// # Example YAML Configuration
///
/// ```yaml
/// oracle:
///   api_url: https://api.us1.fga.dev
///   store_id: 01HXYZ...
///   client_id: abc
///   client_secret: shh
///   api_token_issuer: auth.fga.dev
///   api_audience: https://api.us1.fga.dev/
///   timeout_ms: 5000
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct OracleSettings {
    /// Base URL of the OpenFGA-compatible API.
    /// Environment variable: `CONCIERGE_ORACLE__API_URL`
    pub api_url: Option<String>,

    /// Store to run checks against.
    /// Environment variable: `CONCIERGE_ORACLE__STORE_ID`
    pub store_id: Option<String>,

    /// Pin checks to one authorization model; latest model when unset.
    pub authorization_model_id: Option<String>,

    /// OAuth2 client id for client-credentials token exchange.
    pub client_id: Option<String>,

    /// OAuth2 client secret.
    pub client_secret: Option<String>,

    /// Token issuer host (e.g., "auth.fga.dev") or full URL.
    pub api_token_issuer: Option<String>,

    /// Token audience.
    pub api_audience: Option<String>,

    /// Upper bound for one authorization check, in milliseconds.
    #[serde(default = "default_oracle_timeout")]
    pub timeout_ms: u64,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            api_url: None,
            store_id: None,
            authorization_model_id: None,
            client_id: None,
            client_secret: None,
            api_token_issuer: None,
            api_audience: None,
            timeout_ms: default_oracle_timeout(),
        }
    }
}

fn default_oracle_timeout() -> u64 {
    5000
}

impl OracleSettings {
    /// Check timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns the reason the oracle cannot be used, or `None` when it can.
    pub fn missing_settings(&self) -> Option<String> {
        let mut missing = Vec::new();
        if is_blank(&self.api_url) {
            missing.push("oracle.api_url");
        }
        if is_blank(&self.store_id) {
            missing.push("oracle.store_id");
        }
        if !is_blank(&self.client_id) {
            if is_blank(&self.client_secret) {
                missing.push("oracle.client_secret");
            }
            if is_blank(&self.api_token_issuer) {
                missing.push("oracle.api_token_issuer");
            }
        }

        if missing.is_empty() {
            None
        } else {
            Some(format!("missing {}", missing.join(", ")))
        }
    }
}

pub(crate) fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON format (true for production, false for development)
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MetricsSettings {
    /// Expose the `/metrics` endpoint
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl ServerConfig {
    /// Load configuration from a YAML file with environment variable overrides.
    ///
    /// Environment variables are prefixed with `CONCIERGE_` and use `__` as separator.
    /// For example:
    /// - `CONCIERGE_SERVER__PORT=9090` overrides `server.port`
    /// - `CONCIERGE_ORACLE__STORE_ID=...` overrides `oracle.store_id`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let config = Config::builder()
            .add_source(Config::try_from(&ServerConfig::default())?)
            .add_source(File::from(path).format(FileFormat::Yaml))
            .add_source(env_source())
            .build()?;

        let server_config: ServerConfig = config.try_deserialize()?;
        server_config.validate()?;

        Ok(server_config)
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let config = Config::builder()
            .add_source(Config::try_from(&ServerConfig::default())?)
            .add_source(env_source())
            .build()?;

        let server_config: ServerConfig = config.try_deserialize()?;
        server_config.validate()?;

        Ok(server_config)
    }

    /// Validate the configuration.
    ///
    /// An unconfigured oracle is not an error here; it is reported at
    /// startup and every check then fails closed.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.server.port == 0 {
            return Err(ConfigLoadError::Invalid {
                message: "server.port must be greater than 0".to_string(),
            });
        }

        let valid_backends = ["memory", "json"];
        if !valid_backends.contains(&self.storage.backend.as_str()) {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "storage.backend must be one of: {:?}, got: {}",
                    valid_backends, self.storage.backend
                ),
            });
        }

        if self.storage.backend == "json" && is_blank(&self.storage.data_path) {
            return Err(ConfigLoadError::Invalid {
                message: "storage.data_path is required when backend is 'json'".to_string(),
            });
        }

        if self.oracle.timeout_ms == 0 {
            return Err(ConfigLoadError::Invalid {
                message: "oracle.timeout_ms must be greater than 0".to_string(),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "logging.level must be one of: {:?}, got: {}",
                    valid_levels, self.logging.level
                ),
            });
        }

        Ok(())
    }
}

// Use __ as separator for nested keys: CONCIERGE_SERVER__PORT -> server.port
fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}
