//! Domain-level errors.
//!
//! These errors represent business rule violations and domain logic failures.
//! They are independent of infrastructure concerns (gRPC, database).

use thiserror::Error;

use crate::validator::ValidationErrors;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more fields broke a rule
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// A scalar input was malformed before any rule could run
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
