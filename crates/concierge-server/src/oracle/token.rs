//! OAuth2 client-credentials token exchange for the live oracle.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use super::{OracleError, OracleResult};

/// Tokens are refreshed this long before the issuer says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Client credentials for the token issuer.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    /// Issuer host ("auth.fga.dev") or base URL ("http://127.0.0.1:9000").
    pub api_token_issuer: String,
    pub api_audience: Option<String>,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("api_token_issuer", &self.api_token_issuer)
            .field("api_audience", &self.api_audience)
            .finish()
    }
}

impl ClientCredentials {
    /// Token endpoint URL for the configured issuer.
    pub fn token_url(&self) -> String {
        let issuer = self.api_token_issuer.trim_end_matches('/');
        if issuer.starts_with("http://") || issuer.starts_with("https://") {
            format!("{issuer}/oauth/token")
        } else {
            format!("https://{issuer}/oauth/token")
        }
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    audience: Option<&'a str>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

#[derive(Debug)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Bearer token source with a single cached token.
///
/// Only the access token is cached. Authorization decisions never are.
#[derive(Debug)]
pub(crate) struct TokenSource {
    credentials: ClientCredentials,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenSource {
    pub(crate) fn new(credentials: ClientCredentials) -> Self {
        Self {
            credentials,
            cached: RwLock::new(None),
        }
    }

    /// Returns a valid access token, exchanging credentials when needed.
    pub(crate) async fn bearer(&self, client: &reqwest::Client) -> OracleResult<String> {
        if let Some(token) = self.cached.read().await.as_ref() {
            if token.is_fresh() {
                return Ok(token.access_token.clone());
            }
        }

        let mut cached = self.cached.write().await;
        // Another task may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref() {
            if token.is_fresh() {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.exchange(client).await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    /// Drops the cached token so the next check exchanges credentials again.
    pub(crate) async fn invalidate(&self) {
        if self.cached.write().await.take().is_some() {
            debug!(client_id = %self.credentials.client_id, "Discarded rejected access token");
        }
    }

    async fn exchange(&self, client: &reqwest::Client) -> OracleResult<CachedToken> {
        let url = self.credentials.token_url();
        debug!(%url, client_id = %self.credentials.client_id, "Requesting oracle access token");

        let request = TokenRequest {
            grant_type: "client_credentials",
            client_id: &self.credentials.client_id,
            client_secret: &self.credentials.client_secret,
            audience: self.credentials.api_audience.as_deref(),
        };

        let response = client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| OracleError::unavailable(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::unavailable(format!(
                "token issuer returned {status}"
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| OracleError::unavailable(format!("invalid token response: {e}")))?;

        let lifetime = Duration::from_secs(body.expires_in).saturating_sub(EXPIRY_MARGIN);
        Ok(CachedToken {
            access_token: body.access_token,
            expires_at: Instant::now() + lifetime,
        })
    }
}
