//! concierge-server: Authorization gateway and oracle clients
//!
//! This crate contains the business logic layer including:
//! - The authorization gateway (resolve, authorize, fetch)
//! - Authorization oracle clients (live HTTP and fail-closed stand-in)
//! - Configuration management
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              concierge-server                │
//! ├─────────────────────────────────────────────┤
//! │  config.rs   - Configuration management     │
//! │  handlers/   - Request handlers             │
//! │    gateway/       - Authorization gateway   │
//! │  oracle/     - Authorization oracles        │
//! │    live.rs        - OpenFGA HTTP client     │
//! │    token.rs       - Client credentials      │
//! │    unavailable.rs - Fail-closed stand-in    │
//! └─────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod handlers;
pub mod oracle;

// Re-exports for convenience
pub use config::{ConfigLoadError, OracleSettings, ServerConfig};
pub use handlers::gateway::{
    AuthorizationGateway, GatewayConfig, GatewayFailure, Outcome, OutcomeClass, Refusal,
};
pub use oracle::{
    select_oracle, AuthorizationOracle, LiveOracle, LiveOracleConfig, OracleError, OracleResult,
    UnavailableOracle,
};
