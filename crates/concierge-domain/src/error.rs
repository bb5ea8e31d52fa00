//! Domain error types.

use thiserror::Error;

/// Errors raised while constructing domain values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Identity is not in `type:id` form.
    #[error("invalid identity format: {value}")]
    InvalidIdentity { value: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
