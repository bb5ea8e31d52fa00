//! Outcome types for the authorization gateway.

use std::fmt;

use concierge_domain::Record;

/// Reply for messages outside the profile domain.
pub const GUIDANCE_TEXT: &str =
    "I can help with questions about loyalty points and user profiles.";

/// The oracle denied the requester access to a profile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not authorized for {target_id}")]
pub struct Refusal {
    pub target_id: String,
}

/// The gateway could not produce an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GatewayFailure {
    /// No decision could be obtained (unconfigured, unreachable, timed out
    /// or erroring oracle).
    #[error("authorization unavailable")]
    AuthorizationUnavailable,

    /// Access was granted but no such record exists.
    #[error("record not found")]
    RecordNotFound,

    /// Access was granted but the record store failed.
    #[error("record store unavailable")]
    RecordUnavailable,
}

/// Result of handling one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Generic help for messages with no profile intent.
    Guidance(String),
    /// The requested record, disclosed after an allow decision.
    Answer(Record),
    /// The oracle said no.
    Refusal(Refusal),
    /// No decision or no record.
    Failure(GatewayFailure),
}

/// Coarse outcome class kept in logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeClass {
    Guidance,
    Answer,
    Refusal,
    Unavailable,
    NotFound,
}

impl OutcomeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeClass::Guidance => "guidance",
            OutcomeClass::Answer => "answer",
            OutcomeClass::Refusal => "refusal",
            OutcomeClass::Unavailable => "unavailable",
            OutcomeClass::NotFound => "not_found",
        }
    }
}

impl fmt::Display for OutcomeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Outcome {
    /// Returns the outcome class.
    pub fn class(&self) -> OutcomeClass {
        match self {
            Outcome::Guidance(_) => OutcomeClass::Guidance,
            Outcome::Answer(_) => OutcomeClass::Answer,
            Outcome::Refusal(_) => OutcomeClass::Refusal,
            Outcome::Failure(GatewayFailure::RecordNotFound) => OutcomeClass::NotFound,
            Outcome::Failure(
                GatewayFailure::AuthorizationUnavailable | GatewayFailure::RecordUnavailable,
            ) => OutcomeClass::Unavailable,
        }
    }

    /// Returns the disclosed record, if any.
    pub fn record(&self) -> Option<&Record> {
        match self {
            Outcome::Answer(record) => Some(record),
            _ => None,
        }
    }

    /// Renders the outcome as chat text for the requester.
    pub fn reply(&self) -> String {
        match self {
            Outcome::Guidance(text) => text.clone(),
            Outcome::Answer(record) => format!(
                "Here is the profile for {}:\nLoyalty Points: {}\nTier: {}\nLast Visit: {}",
                record.name, record.loyalty_points, record.tier, record.last_visit
            ),
            Outcome::Refusal(refusal) => format!(
                "You are not authorized to view the profile for user {}.",
                refusal.target_id
            ),
            Outcome::Failure(GatewayFailure::AuthorizationUnavailable) => {
                "Authorization is unavailable right now. Please try again later.".to_string()
            }
            Outcome::Failure(GatewayFailure::RecordNotFound) => "Profile not found.".to_string(),
            Outcome::Failure(GatewayFailure::RecordUnavailable) => {
                "Profiles are unavailable right now. Please try again later.".to_string()
            }
        }
    }
}
