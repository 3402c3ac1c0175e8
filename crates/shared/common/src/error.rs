//! Unified error handling for the gRPC boundary.
//!
//! Every failure inside a service is an [`AppError`]. Converting it into a
//! [`tonic::Status`] is the only way errors leave the process, and that
//! conversion never echoes storage details to the caller.

use std::time::Duration;

use domain::{DomainError, ValidationErrors};
use thiserror::Error;
use tonic::{Code, Status};
use tonic_types::{ErrorDetails, StatusExt};

pub const MSG_USER_NOT_FOUND: &str = "user not found";
pub const MSG_EDIT_CONFLICT: &str = "unable to update due to edit conflict, please try again";
pub const MSG_INTERNAL_PROBLEM: &str = "the server encountered a problem";
pub const MSG_INVALID_REQUEST: &str = "invalid request";

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Request shape
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Validation failed: {0}")]
    FailedValidation(ValidationErrors),

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    #[error("Edit conflict")]
    EditConflict,

    // External service errors
    #[cfg(feature = "database")]
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("Storage call timed out after {0:?}")]
    Timeout(Duration),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// Get gRPC status code
    pub fn grpc_code(&self) -> Code {
        match self {
            AppError::InvalidArgument(_) | AppError::FailedValidation(_) => Code::InvalidArgument,
            AppError::NotFound => Code::NotFound,
            AppError::EditConflict => Code::Aborted,
            _ => Code::Internal,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            // Show full message for client errors
            AppError::InvalidArgument(msg) => msg.clone(),
            AppError::FailedValidation(_) => MSG_INVALID_REQUEST.to_string(),
            AppError::NotFound => MSG_USER_NOT_FOUND.to_string(),
            AppError::EditConflict => MSG_EDIT_CONFLICT.to_string(),

            // Hide details for internal errors
            #[cfg(feature = "database")]
            AppError::Database(e) => {
                tracing::error!(error = ?e, "internal server error");
                MSG_INTERNAL_PROBLEM.to_string()
            }
            AppError::Timeout(after) => {
                tracing::error!(?after, "storage call timed out");
                MSG_INTERNAL_PROBLEM.to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                MSG_INTERNAL_PROBLEM.to_string()
            }
        }
    }

    /// True for errors that are the server's fault rather than the caller's.
    pub fn is_internal(&self) -> bool {
        self.grpc_code() == Code::Internal
    }
}

// =============================================================================
// gRPC Status (Tonic)
// =============================================================================

impl From<AppError> for Status {
    fn from(err: AppError) -> Self {
        match err {
            AppError::FailedValidation(errors) => {
                let mut details = ErrorDetails::new();
                for (field, description) in errors {
                    details.add_bad_request_violation(field, description);
                }
                Status::with_error_details(Code::InvalidArgument, MSG_INVALID_REQUEST, details)
            }
            other => Status::new(other.grpc_code(), other.user_message()),
        }
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(errors) => AppError::FailedValidation(errors),
            DomainError::InvalidArgument(msg) => AppError::InvalidArgument(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
