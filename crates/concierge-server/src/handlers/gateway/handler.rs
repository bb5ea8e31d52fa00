//! Authorization gateway implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, instrument, warn};

use concierge_domain::{
    AuthorizationDecision, AuthorizationQuery, EntityResolver, Identity, Resolution,
};
use concierge_storage::RecordStore;

use super::types::{GatewayFailure, Outcome, Refusal, GUIDANCE_TEXT};
use crate::oracle::{AuthorizationOracle, OracleError};

/// Default upper bound for one oracle check.
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the authorization gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Timeout for one oracle check. Expiry counts as an unavailable oracle.
    pub check_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            check_timeout: DEFAULT_CHECK_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    /// Creates a new configuration with the specified check timeout.
    pub fn with_check_timeout(mut self, check_timeout: Duration) -> Self {
        self.check_timeout = check_timeout;
        self
    }
}

/// Resolve, authorize, then fetch.
///
/// The gateway holds no per-request state; one instance serves every
/// request concurrently. The requester identity is passed to each call.
pub struct AuthorizationGateway<S, O>
where
    S: RecordStore + ?Sized,
    O: AuthorizationOracle + ?Sized,
{
    store: Arc<S>,
    oracle: Arc<O>,
    resolver: EntityResolver,
    config: GatewayConfig,
}

impl<S, O> AuthorizationGateway<S, O>
where
    S: RecordStore + ?Sized,
    O: AuthorizationOracle + ?Sized,
{
    /// Creates a gateway with the default resolver and configuration.
    pub fn new(store: Arc<S>, oracle: Arc<O>) -> Self {
        Self {
            store,
            oracle,
            resolver: EntityResolver::default(),
            config: GatewayConfig::default(),
        }
    }

    /// Replaces the entity resolver.
    pub fn with_resolver(mut self, resolver: EntityResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replaces the gateway configuration.
    pub fn with_config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn oracle(&self) -> &Arc<O> {
        &self.oracle
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Handles one chat message from `requester`.
    #[instrument(skip(self, query), fields(requester = %requester))]
    pub async fn handle(&self, requester: &Identity, query: &str) -> Outcome {
        let outcome = match self.resolver.resolve(query, requester) {
            Resolution::NoIntent => {
                debug!("No profile intent; replying with guidance");
                Outcome::Guidance(GUIDANCE_TEXT.to_string())
            }
            Resolution::Target(target_id) => self.authorize_and_fetch(requester, &target_id).await,
        };

        record_outcome(&outcome);
        outcome
    }

    /// Handles a direct request for `target_id`'s profile, skipping resolution.
    #[instrument(skip(self), fields(requester = %requester))]
    pub async fn check_profile(&self, requester: &Identity, target_id: &str) -> Outcome {
        let outcome = self.authorize_and_fetch(requester, target_id).await;
        record_outcome(&outcome);
        outcome
    }

    async fn authorize_and_fetch(&self, requester: &Identity, target_id: &str) -> Outcome {
        let query = AuthorizationQuery::profile_owner(requester, target_id);

        match self.decide(&query).await {
            Ok(decision) if decision.allowed => {
                info!(
                    subject = %query.subject,
                    relation = %query.relation,
                    object = %query.object,
                    outcome = "allowed",
                    "Authorization decision"
                );
            }
            Ok(_) => {
                info!(
                    subject = %query.subject,
                    relation = %query.relation,
                    object = %query.object,
                    outcome = "denied",
                    "Authorization decision"
                );
                return Outcome::Refusal(Refusal {
                    target_id: target_id.to_string(),
                });
            }
            Err(e) => {
                warn!(
                    subject = %query.subject,
                    relation = %query.relation,
                    object = %query.object,
                    outcome = "unavailable",
                    oracle = self.oracle.name(),
                    error = %e,
                    "Authorization decision unavailable; failing closed"
                );
                return Outcome::Failure(GatewayFailure::AuthorizationUnavailable);
            }
        }

        match self.store.get(target_id).await {
            Ok(Some(record)) => Outcome::Answer(record),
            Ok(None) => {
                info!(target_id, "Authorized profile does not exist");
                Outcome::Failure(GatewayFailure::RecordNotFound)
            }
            Err(e) => {
                error!(
                    target_id,
                    backend = self.store.backend_name(),
                    error = %e,
                    "Record store lookup failed"
                );
                Outcome::Failure(GatewayFailure::RecordUnavailable)
            }
        }
    }

    /// Runs one oracle check under the configured timeout.
    async fn decide(
        &self,
        query: &AuthorizationQuery,
    ) -> Result<AuthorizationDecision, OracleError> {
        let start = Instant::now();
        let result = match tokio::time::timeout(self.config.check_timeout, self.oracle.check(query))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(OracleError::unavailable(format!(
                "check timed out after {}ms",
                self.config.check_timeout.as_millis()
            ))),
        };

        let status = match &result {
            Ok(decision) if decision.allowed => "allowed",
            Ok(_) => "denied",
            Err(OracleError::Unavailable { .. }) => "unavailable",
            Err(OracleError::Backend { .. }) => "error",
        };
        metrics::histogram!("concierge_oracle_check_duration_seconds", "status" => status)
            .record(start.elapsed().as_secs_f64());

        result
    }
}

fn record_outcome(outcome: &Outcome) {
    metrics::counter!("concierge_gateway_outcomes_total", "class" => outcome.class().as_str())
        .increment(1);
}
