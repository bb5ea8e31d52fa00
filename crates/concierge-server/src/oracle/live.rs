//! OpenFGA-compatible HTTP check client.
//!
//! Sends `POST {api_url}/stores/{store_id}/check` with a single tuple key
//! and reads `{"allowed": bool}` back. No retries: a failed check is
//! reported to the caller immediately.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use concierge_domain::{AuthorizationDecision, AuthorizationQuery};

use super::token::{ClientCredentials, TokenSource};
use super::{AuthorizationOracle, OracleError, OracleResult};
use crate::config::{is_blank, OracleSettings};

/// Connection details for a [`LiveOracle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveOracleConfig {
    /// Base URL without the `/stores/...` suffix.
    pub api_url: String,
    pub store_id: String,
    pub authorization_model_id: Option<String>,
    pub credentials: Option<ClientCredentials>,
    /// Per-request timeout for both token and check calls.
    pub timeout: Duration,
}

impl LiveOracleConfig {
    /// Creates an unauthenticated configuration.
    pub fn new(api_url: impl Into<String>, store_id: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            store_id: store_id.into(),
            authorization_model_id: None,
            credentials: None,
            timeout: Duration::from_secs(5),
        }
    }

    /// Builds a configuration from settings, or `None` when required
    /// settings are missing.
    pub fn from_settings(settings: &OracleSettings) -> Option<Self> {
        if settings.missing_settings().is_some() {
            return None;
        }

        let credentials = if is_blank(&settings.client_id) {
            None
        } else {
            Some(ClientCredentials {
                client_id: settings.client_id.clone()?,
                client_secret: settings.client_secret.clone()?,
                api_token_issuer: settings.api_token_issuer.clone()?,
                api_audience: settings.api_audience.clone(),
            })
        };

        Some(Self {
            api_url: settings.api_url.clone()?,
            store_id: settings.store_id.clone()?,
            authorization_model_id: settings
                .authorization_model_id
                .clone()
                .filter(|id| !id.trim().is_empty()),
            credentials,
            timeout: settings.timeout(),
        })
    }

    pub fn with_credentials(mut self, credentials: ClientCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_model_id(mut self, authorization_model_id: impl Into<String>) -> Self {
        self.authorization_model_id = Some(authorization_model_id.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn check_url(&self) -> String {
        format!(
            "{}/stores/{}/check",
            self.api_url.trim_end_matches('/'),
            self.store_id
        )
    }
}

#[derive(Serialize)]
struct TupleKeyBody<'a> {
    user: String,
    relation: &'a str,
    object: &'a str,
}

#[derive(Serialize)]
struct CheckRequestBody<'a> {
    tuple_key: TupleKeyBody<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    authorization_model_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct CheckResponseBody {
    allowed: bool,
}

/// HTTP client for an OpenFGA-compatible check endpoint.
#[derive(Debug)]
pub struct LiveOracle {
    client: reqwest::Client,
    config: LiveOracleConfig,
    tokens: Option<TokenSource>,
}

impl LiveOracle {
    /// Builds the client. Fails with `Unavailable` if the HTTP client
    /// cannot be constructed.
    pub fn new(config: LiveOracleConfig) -> OracleResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OracleError::unavailable(format!("failed to build http client: {e}")))?;
        let tokens = config.credentials.clone().map(TokenSource::new);

        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    pub fn config(&self) -> &LiveOracleConfig {
        &self.config
    }
}

/// Maps transport failures: unreachable or slow backends are `Unavailable`.
fn transport_error(err: reqwest::Error) -> OracleError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        OracleError::unavailable(err.to_string())
    } else {
        OracleError::backend(err.to_string())
    }
}

#[async_trait]
impl AuthorizationOracle for LiveOracle {
    #[instrument(skip(self), fields(store_id = %self.config.store_id))]
    async fn check(&self, query: &AuthorizationQuery) -> OracleResult<AuthorizationDecision> {
        let body = CheckRequestBody {
            tuple_key: TupleKeyBody {
                user: query.subject.to_string(),
                relation: &query.relation,
                object: &query.object,
            },
            authorization_model_id: self.config.authorization_model_id.as_deref(),
        };

        let mut request = self.client.post(self.config.check_url()).json(&body);
        if let Some(tokens) = &self.tokens {
            request = request.bearer_auth(tokens.bearer(&self.client).await?);
        }

        let response = request.send().await.map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            // A revoked or rotated token must not outlive this rejection
            if let Some(tokens) = &self.tokens {
                tokens.invalidate().await;
            }
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(OracleError::unavailable(format!(
                "oracle rejected credentials ({status})"
            )));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(OracleError::backend(format!(
                "check returned {status}: {detail}"
            )));
        }

        let decision: CheckResponseBody = response
            .json()
            .await
            .map_err(|e| OracleError::backend(format!("invalid check response: {e}")))?;

        debug!(allowed = decision.allowed, "Oracle check completed");
        Ok(AuthorizationDecision::from(decision.allowed))
    }

    fn name(&self) -> &'static str {
        "live"
    }
}
