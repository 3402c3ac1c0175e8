//! User domain entity and its validation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    MSG_AGE_POSITIVE, MSG_INVALID_EMAIL, MSG_MUST_BE_PROVIDED, MSG_USER_ID_POSITIVE,
};
use crate::error::{DomainError, DomainResult};
use crate::validator::{is_email, Validator};

/// User domain entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Assigned by the store on insert
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i32,
    /// Assigned by the store on insert, never changed afterwards
    pub created_at: DateTime<Utc>,
    /// Concurrency token; bumped by exactly one on every successful update
    pub version: i32,
}

impl User {
    /// Build an unsaved user. Identity, timestamp and version are left for the
    /// store to assign.
    pub fn new(name: String, email: String, age: i32) -> Self {
        Self {
            name,
            email,
            age,
            ..Default::default()
        }
    }

    /// Apply the present fields of `changes`, leaving the rest untouched.
    pub fn apply(&mut self, changes: UserUpdate) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(age) = changes.age {
            self.age = age;
        }
    }
}

/// User creation data transfer object
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub age: i32,
}

impl From<CreateUser> for User {
    fn from(input: CreateUser) -> Self {
        User::new(input.name, input.email, input.age)
    }
}

/// Partial update. `None` leaves the field unchanged; `Some("")` sets it empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
}

/// Check every user rule, recording violations in `v`.
///
/// Works on a complete record, so partial updates must be merged with
/// [`User::apply`] before calling this.
pub fn validate_user(v: &mut Validator, user: &User) {
    v.check(!user.name.is_empty(), "name", MSG_MUST_BE_PROVIDED);
    v.check(!user.email.is_empty(), "email", MSG_MUST_BE_PROVIDED);
    v.check(is_email(&user.email), "email", MSG_INVALID_EMAIL);
    v.check(user.age > 0, "age", MSG_AGE_POSITIVE);
}

/// Reject identities the store can never have assigned.
pub fn ensure_user_id(id: i64) -> DomainResult<i64> {
    if id <= 0 {
        return Err(DomainError::InvalidArgument(MSG_USER_ID_POSITIVE.to_string()));
    }
    Ok(id)
}
