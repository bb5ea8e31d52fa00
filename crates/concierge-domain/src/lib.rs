//! concierge-domain: Core profile and authorization domain types
//!
//! This crate contains the pieces of the concierge that do not touch I/O:
//! - Profile records and their response-shaped projection
//! - Requester identities and authorization queries
//! - Entity resolution from free-text chat messages
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              concierge-domain                │
//! ├─────────────────────────────────────────────┤
//! │  model/      - Records, identities, queries │
//! │  resolver/   - Free text -> target id       │
//! └─────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod model;
pub mod resolver;

// Re-export commonly used types at the crate root
pub use error::{DomainError, DomainResult};
pub use model::{
    AuthorizationDecision, AuthorizationQuery, Identity, ProfileView, Record, Tier, OWNER_RELATION,
    PROFILE_OBJECT_TYPE, USER_SUBJECT_TYPE,
};
pub use resolver::{DirectoryEntry, EntityResolver, Resolution, ResolverConfig};
