//! Oracle used when no authorization backend is configured.

use async_trait::async_trait;
use tracing::error;

use concierge_domain::{AuthorizationDecision, AuthorizationQuery};

use super::{AuthorizationOracle, OracleError, OracleResult};

const DEFAULT_REASON: &str = "authorization oracle is not configured";

/// Oracle that fails every check with [`OracleError::Unavailable`].
#[derive(Debug, Clone)]
pub struct UnavailableOracle {
    reason: String,
}

impl UnavailableOracle {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Default for UnavailableOracle {
    fn default() -> Self {
        Self::new(DEFAULT_REASON)
    }
}

#[async_trait]
impl AuthorizationOracle for UnavailableOracle {
    async fn check(&self, query: &AuthorizationQuery) -> OracleResult<AuthorizationDecision> {
        error!(
            subject = %query.subject,
            relation = %query.relation,
            object = %query.object,
            reason = %self.reason,
            "Authorization check attempted without a configured oracle"
        );
        Err(OracleError::unavailable(self.reason.clone()))
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}
