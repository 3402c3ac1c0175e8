//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Pagination
// =============================================================================

/// Default starting page number (1-indexed)
pub const DEFAULT_PAGE: i64 = 1;

/// Default number of records per page
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Highest page number a client may request
pub const MAX_PAGE: i64 = 10_000_000;

/// Maximum allowed records per page
pub const MAX_PAGE_SIZE: i64 = 100;

/// Sort key used when the client does not ask for one
pub const DEFAULT_SORT: &str = "id";

/// Prefix marking a descending sort key
pub const DESCENDING_SORT_PREFIX: char = '-';

// =============================================================================
// Users
// =============================================================================

/// Columns a user listing may be ordered by
pub const USER_SORT_SAFELIST: &[&str] = &["id", "name", "email", "age", "created_at"];

/// Version assigned to a freshly created record
pub const INITIAL_VERSION: i32 = 1;

// =============================================================================
// Validation messages
// =============================================================================

pub const MSG_MUST_BE_PROVIDED: &str = "must be provided";
pub const MSG_INVALID_EMAIL: &str = "must be a valid email address";
pub const MSG_AGE_POSITIVE: &str = "must be greater than 0";
pub const MSG_GREATER_THAN_ZERO: &str = "must be greater than zero";
pub const MSG_PAGE_MAXIMUM: &str = "must be a maximum of 10 million";
pub const MSG_PAGE_SIZE_MAXIMUM: &str = "must be a maximum of 100";
pub const MSG_INVALID_SORT: &str = "invalid sort value";
pub const MSG_USER_ID_POSITIVE: &str = "user id must be greater than zero";
