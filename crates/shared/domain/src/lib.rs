//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the user record and its rules, the field validator, and the pagination
//! contract shared by every store implementation.

pub mod constants;
pub mod error;
pub mod filters;
pub mod user;
pub mod validator;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use filters::{validate_filters, Filters, MetaData, SortDirection};
pub use user::{ensure_user_id, validate_user, CreateUser, User, UserUpdate};
pub use crate::validator::{ValidationErrors, Validator};
