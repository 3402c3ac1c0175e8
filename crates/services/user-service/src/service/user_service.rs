//! User service - Handles user-related business logic.
//!
//! Each operation is a single pass: check the input, make one storage call
//! (two for update), and hand the result or a typed error back. Nothing is
//! retried here; an edit conflict goes back to the caller to resolve.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use common::{AppError, AppResult};
use domain::{
    ensure_user_id, validate_filters, validate_user, CreateUser, Filters, MetaData, User,
    UserUpdate, Validator,
};

use crate::config::DEFAULT_STORAGE_TIMEOUT_MS;
use crate::repository::UserRepository;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Validate and store a new user
    async fn create_user(&self, input: CreateUser) -> AppResult<User>;

    /// Get user by ID
    async fn get_user(&self, id: i64) -> AppResult<User>;

    /// One page of users plus pagination metadata
    async fn list_users(&self, filters: Filters) -> AppResult<(Vec<User>, MetaData)>;

    /// Delete user, returning the removed record
    async fn delete_user(&self, id: i64) -> AppResult<User>;

    /// Apply the present fields of `changes` under optimistic concurrency
    async fn update_user(&self, id: i64, changes: UserUpdate) -> AppResult<User>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
    storage_timeout: Duration,
}

impl UserManager {
    /// Create new user service instance with repository
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self::with_timeout(repo, Duration::from_millis(DEFAULT_STORAGE_TIMEOUT_MS))
    }

    /// Create a service whose storage calls give up after `storage_timeout`
    pub fn with_timeout(repo: Arc<dyn UserRepository>, storage_timeout: Duration) -> Self {
        Self {
            repo,
            storage_timeout,
        }
    }

    /// Run one storage call under the configured deadline.
    async fn bounded<T>(&self, call: impl Future<Output = AppResult<T>> + Send) -> AppResult<T> {
        tokio::time::timeout(self.storage_timeout, call)
            .await
            .map_err(|_| AppError::Timeout(self.storage_timeout))?
    }
}

fn check_user(user: &User) -> AppResult<()> {
    let mut v = Validator::new();
    validate_user(&mut v, user);
    v.into_result().map_err(|e| {
        let err = AppError::from(e);
        tracing::warn!(error = %err, "user validation failed");
        err
    })
}

#[async_trait]
impl UserService for UserManager {
    async fn create_user(&self, input: CreateUser) -> AppResult<User> {
        let user = User::from(input);
        check_user(&user)?;

        let user = self.bounded(self.repo.create(user)).await?;
        tracing::info!(user_id = user.id, "user created");
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> AppResult<User> {
        let id = ensure_user_id(id)?;
        self.bounded(self.repo.get_by_id(id)).await
    }

    async fn list_users(&self, filters: Filters) -> AppResult<(Vec<User>, MetaData)> {
        let mut v = Validator::new();
        validate_filters(&mut v, &filters);
        if let Err(e) = v.into_result() {
            let err = AppError::from(e);
            tracing::warn!(error = %err, "list filters rejected");
            return Err(err);
        }

        self.bounded(self.repo.get_all(&filters)).await
    }

    async fn delete_user(&self, id: i64) -> AppResult<User> {
        let id = ensure_user_id(id)?;

        let user = self.bounded(self.repo.delete_by_id(id)).await?;
        tracing::info!(user_id = user.id, "user deleted");
        Ok(user)
    }

    async fn update_user(&self, id: i64, changes: UserUpdate) -> AppResult<User> {
        let id = ensure_user_id(id)?;

        let mut user = self.bounded(self.repo.get_by_id(id)).await?;
        user.apply(changes);
        check_user(&user)?;

        // `user.version` is still the version we read
        match self.bounded(self.repo.update(user)).await {
            Ok(updated) => {
                tracing::info!(user_id = updated.id, version = updated.version, "user updated");
                Ok(updated)
            }
            Err(AppError::EditConflict) => {
                tracing::warn!(user_id = id, "edit conflict on update");
                Err(AppError::EditConflict)
            }
            Err(e) => Err(e),
        }
    }
}
