//! Authorization gateway for profile questions.
//!
//! The gateway owns the path from a chat message to a disclosed profile:
//!
//! 1. **Resolve**: the entity resolver picks the target profile id, or
//!    reports that the message has no profile intent
//! 2. **Authorize**: the oracle is asked whether the requester is `owner`
//!    of `profile:<target>`, under a bounded timeout
//! 3. **Fetch**: only after an allow decision is the record read
//!
//! Any failure to obtain a decision is a [`GatewayFailure`], never an
//! answer. Messages without intent get guidance text and touch neither the
//! oracle nor the store.

mod handler;
mod types;

pub use handler::{AuthorizationGateway, GatewayConfig, DEFAULT_CHECK_TIMEOUT};
pub use types::{GatewayFailure, Outcome, OutcomeClass, Refusal, GUIDANCE_TEXT};

#[cfg(test)]
mod tests;
