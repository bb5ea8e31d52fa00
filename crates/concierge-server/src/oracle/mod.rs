//! Authorization oracle clients.
//!
//! The gateway asks a single question of the oracle: may `subject` hold
//! `relation` on `object`? Two implementations exist and one is chosen at
//! startup by [`select_oracle`]:
//!
//! - [`LiveOracle`]: OpenFGA-compatible HTTP check client
//! - [`UnavailableOracle`]: stands in when the oracle is not configured and
//!   fails every check
//!
//! Callers must treat both error kinds the same way: no decision, no data.

mod live;
mod token;
mod unavailable;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};

use concierge_domain::{AuthorizationDecision, AuthorizationQuery};

use crate::config::OracleSettings;

pub use live::{LiveOracle, LiveOracleConfig};
pub use token::ClientCredentials;
pub use unavailable::UnavailableOracle;

/// Errors returned by an authorization oracle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    /// The oracle cannot be reached or is not configured (includes timeouts).
    #[error("authorization oracle unavailable: {message}")]
    Unavailable { message: String },

    /// The oracle answered with something other than a decision.
    #[error("authorization oracle error: {message}")]
    Backend { message: String },
}

impl OracleError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Result type for oracle operations.
pub type OracleResult<T> = Result<T, OracleError>;

/// Decision oracle for relationship-based authorization.
#[async_trait]
pub trait AuthorizationOracle: Send + Sync + 'static {
    /// Asks whether `query.subject` holds `query.relation` on `query.object`.
    ///
    /// Every call is evaluated by the oracle; implementations must not
    /// cache decisions.
    async fn check(&self, query: &AuthorizationQuery) -> OracleResult<AuthorizationDecision>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Chooses the oracle implementation for the lifetime of the process.
///
/// Returns an [`UnavailableOracle`] when settings are incomplete or the HTTP
/// client cannot be built, so a misconfigured deployment refuses every
/// profile request instead of refusing to start.
pub fn select_oracle(settings: &OracleSettings) -> Arc<dyn AuthorizationOracle> {
    if let Some(reason) = settings.missing_settings() {
        error!(
            %reason,
            "Authorization oracle is not configured; profile requests will fail closed"
        );
        return Arc::new(UnavailableOracle::new(reason));
    }

    let config = match LiveOracleConfig::from_settings(settings) {
        Some(config) => config,
        None => return Arc::new(UnavailableOracle::default()),
    };

    match LiveOracle::new(config) {
        Ok(oracle) => {
            info!(
                api_url = %oracle.config().api_url,
                store_id = %oracle.config().store_id,
                authenticated = oracle.config().credentials.is_some(),
                "Authorization oracle configured"
            );
            Arc::new(oracle)
        }
        Err(e) => {
            error!(error = %e, "Failed to build authorization oracle client");
            Arc::new(UnavailableOracle::new(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_oracle_without_settings_is_unavailable() {
        let oracle = select_oracle(&OracleSettings::default());
        assert_eq!(oracle.name(), "unavailable");
    }

    #[test]
    fn test_select_oracle_with_partial_credentials_is_unavailable() {
        let settings = OracleSettings {
            api_url: Some("http://localhost:8080".to_string()),
            store_id: Some("store".to_string()),
            client_id: Some("client".to_string()),
            ..Default::default()
        };
        assert_eq!(select_oracle(&settings).name(), "unavailable");
    }

    #[test]
    fn test_select_oracle_with_settings_is_live() {
        let settings = OracleSettings {
            api_url: Some("http://localhost:8080".to_string()),
            store_id: Some("store".to_string()),
            ..Default::default()
        };
        assert_eq!(select_oracle(&settings).name(), "live");
    }

    #[test]
    fn test_oracle_error_display() {
        assert_eq!(
            OracleError::unavailable("connection refused").to_string(),
            "authorization oracle unavailable: connection refused"
        );
        assert_eq!(
            OracleError::backend("500").to_string(),
            "authorization oracle error: 500"
        );
    }
}
