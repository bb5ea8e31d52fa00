//! Application state for HTTP handlers.

use std::sync::Arc;

use concierge_server::handlers::gateway::{AuthorizationGateway, GatewayConfig};
use concierge_server::oracle::AuthorizationOracle;
use concierge_storage::RecordStore;

/// The gateway as the HTTP layer holds it: store and oracle chosen at startup.
pub type SharedGateway = AuthorizationGateway<dyn RecordStore, dyn AuthorizationOracle>;

/// Application state shared across all HTTP handlers.
///
/// Holds no per-request data. The requester identity arrives with each
/// request and is handed to the gateway per call.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<SharedGateway>,
}

impl AppState {
    /// Creates state around a gateway with default resolver and timeout.
    pub fn new(store: Arc<dyn RecordStore>, oracle: Arc<dyn AuthorizationOracle>) -> Self {
        Self::with_gateway(AuthorizationGateway::new(store, oracle))
    }

    /// Creates state around a gateway with a custom configuration.
    pub fn with_config(
        store: Arc<dyn RecordStore>,
        oracle: Arc<dyn AuthorizationOracle>,
        config: GatewayConfig,
    ) -> Self {
        Self::with_gateway(AuthorizationGateway::new(store, oracle).with_config(config))
    }

    pub fn with_gateway(gateway: SharedGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }

    /// The record store behind the gateway.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        self.gateway.store()
    }
}
