//! Profile records and authorization value types.

mod record;
mod types;
mod types_proptest;

pub use record::{ProfileView, Record, Tier};
pub use types::{
    AuthorizationDecision, AuthorizationQuery, Identity, OWNER_RELATION, PROFILE_OBJECT_TYPE,
    USER_SUBJECT_TYPE,
};
