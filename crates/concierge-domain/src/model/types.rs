//! Identity and authorization query types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Subject type used for requesters (`user:<id>`).
pub const USER_SUBJECT_TYPE: &str = "user";

/// Object type under which profile records are registered with the oracle.
pub const PROFILE_OBJECT_TYPE: &str = "profile";

/// Relation that grants read access to a profile.
pub const OWNER_RELATION: &str = "owner";

/// A requester identity in `type:id` form (e.g., "user:user_123").
///
/// The identity is authenticated upstream; the concierge only carries it
/// through to the authorization oracle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity {
    subject_type: String,
    subject_id: String,
}

impl Identity {
    /// Creates a `user:<id>` identity from a bare user id.
    pub fn user(user_id: impl Into<String>) -> DomainResult<Self> {
        let subject_id = user_id.into();
        if subject_id.trim().is_empty() || subject_id.contains(':') {
            return Err(DomainError::InvalidIdentity { value: subject_id });
        }
        Ok(Self {
            subject_type: USER_SUBJECT_TYPE.to_string(),
            subject_id,
        })
    }

    /// Parses an identity from "type:id" format.
    pub fn parse(value: &str) -> DomainResult<Self> {
        let invalid = || DomainError::InvalidIdentity {
            value: value.to_string(),
        };
        let (subject_type, subject_id) = value.split_once(':').ok_or_else(invalid)?;
        if subject_type.is_empty() || subject_id.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            subject_type: subject_type.to_string(),
            subject_id: subject_id.to_string(),
        })
    }

    /// Returns the type portion (e.g., "user").
    pub fn subject_type(&self) -> &str {
        &self.subject_type
    }

    /// Returns the id portion (e.g., "user_123").
    pub fn id(&self) -> &str {
        &self.subject_id
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.subject_type, self.subject_id)
    }
}

impl TryFrom<String> for Identity {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.to_string()
    }
}

/// A single `(subject, relation, object)` question for the oracle.
///
/// Built fresh for every check and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthorizationQuery {
    /// The requester (e.g., "user:user_456").
    pub subject: Identity,
    /// The relation to check (e.g., "owner").
    pub relation: String,
    /// The object identifier (e.g., "profile:user_123").
    pub object: String,
}

impl AuthorizationQuery {
    /// Creates a query from its parts.
    pub fn new(
        subject: Identity,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject,
            relation: relation.into(),
            object: object.into(),
        }
    }

    /// Creates the `owner` check on `profile:<target_id>` for a requester.
    pub fn profile_owner(subject: &Identity, target_id: &str) -> Self {
        Self::new(
            subject.clone(),
            OWNER_RELATION,
            format!("{PROFILE_OBJECT_TYPE}:{target_id}"),
        )
    }
}

impl fmt::Display for AuthorizationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}@{}", self.object, self.relation, self.subject)
    }
}

/// The oracle's answer to an [`AuthorizationQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationDecision {
    pub allowed: bool,
}

impl From<bool> for AuthorizationDecision {
    fn from(allowed: bool) -> Self {
        Self { allowed }
    }
}
