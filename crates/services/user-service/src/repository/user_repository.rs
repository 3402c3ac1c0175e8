//! User repository: the storage port and its PostgreSQL implementation.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IsolationLevel,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
    UpdateMany,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use common::{AppError, AppResult, OptionExt};
use domain::{Filters, MetaData, SortDirection, User};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Implementations must make [`UserRepository::update`] a single conditional
/// write keyed on `(id, version)`; the service never holds a lock between
/// reading a record and writing it back.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. The returned copy carries the assigned id,
    /// `created_at` and `version = 1`.
    async fn create(&self, user: User) -> AppResult<User>;

    /// Find user by ID, failing with `NotFound` when absent
    async fn get_by_id(&self, id: i64) -> AppResult<User>;

    /// One page of users ordered per `filters`, plus metadata for the whole set
    async fn get_all(&self, filters: &Filters) -> AppResult<(Vec<User>, MetaData)>;

    /// Remove a user, returning the snapshot that was deleted
    async fn delete_by_id(&self, id: i64) -> AppResult<User>;

    /// Write `user` back if the stored version still equals `user.version`.
    ///
    /// Returns the stored copy with the bumped version, or `EditConflict` when
    /// the record changed or vanished since it was read.
    async fn update(&self, user: User) -> AppResult<User>;
}

/// Concrete implementation of UserRepository on PostgreSQL
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Page of users ordered by the requested column, ties broken by ascending id.
///
/// Callers must pass filters whose sort key already passed validation.
fn page_query(filters: &Filters) -> AppResult<Select<UserEntity>> {
    let column = user::Column::from_sort_key(filters.sort_column()).ok_or_else(|| {
        AppError::internal(format!("unmapped sort column {}", filters.sort_column()))
    })?;
    let order = match filters.sort_direction() {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    };

    Ok(UserEntity::find()
        .order_by(column, order)
        .order_by_asc(user::Column::Id)
        .limit(filters.limit())
        .offset(filters.offset()))
}

/// Count and page run in one read-only REPEATABLE READ snapshot.
fn page_snapshot() -> (Option<IsolationLevel>, Option<AccessMode>) {
    (Some(IsolationLevel::RepeatableRead), Some(AccessMode::ReadOnly))
}

/// Row lock taken before a delete so the returned snapshot is the removed row.
fn locked_row(id: i64) -> Select<UserEntity> {
    UserEntity::find_by_id(id).lock_exclusive()
}

/// Single conditional write keyed on `(id, version)` that bumps the version.
fn versioned_update(user: &User) -> UpdateMany<UserEntity> {
    UserEntity::update_many()
        .col_expr(user::Column::Name, Expr::value(user.name.clone()))
        .col_expr(user::Column::Email, Expr::value(user.email.clone()))
        .col_expr(user::Column::Age, Expr::value(user.age))
        .col_expr(
            user::Column::Version,
            Expr::col(user::Column::Version).add(1),
        )
        .filter(user::Column::Id.eq(user.id))
        .filter(user::Column::Version.eq(user.version))
}

#[async_trait]
impl UserRepository for UserStore {
    async fn create(&self, user: User) -> AppResult<User> {
        // id, created_at and version come from column defaults
        let active_model = ActiveModel {
            name: Set(user.name),
            email: Set(user.email),
            age: Set(user.age),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await?;
        Ok(User::from(model))
    }

    async fn get_by_id(&self, id: i64) -> AppResult<User> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(User::from)
            .ok_or_not_found()
    }

    async fn get_all(&self, filters: &Filters) -> AppResult<(Vec<User>, MetaData)> {
        let query = page_query(filters)?;

        let (isolation, access) = page_snapshot();
        let txn = self.db.begin_with_config(isolation, access).await?;

        let total = UserEntity::find().count(&txn).await?;
        let models = query.all(&txn).await?;

        txn.commit().await?;

        let users = models.into_iter().map(User::from).collect();
        Ok((users, MetaData::for_filters(total, filters)))
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<User> {
        let txn = self.db.begin().await?;

        let model = locked_row(id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let result = UserEntity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        txn.commit().await?;
        Ok(User::from(model))
    }

    async fn update(&self, mut user: User) -> AppResult<User> {
        let result = versioned_update(&user).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::EditConflict);
        }

        user.version += 1;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sea_orm::{DbBackend, QueryTrait};

    use super::*;

    fn postgres_sql<Q: QueryTrait>(query: Q) -> String {
        query.build(DbBackend::Postgres).to_string()
    }

    #[test]
    fn test_update_is_conditional_on_id_and_version() {
        let user = User {
            id: 7,
            name: "John".to_string(),
            email: "john@gmail.com".to_string(),
            age: 21,
            created_at: Utc::now(),
            version: 3,
        };

        let sql = postgres_sql(versioned_update(&user));

        assert!(sql.starts_with(r#"UPDATE "users" SET"#), "{sql}");
        assert!(sql.contains(r#""name" = 'John'"#), "{sql}");
        assert!(sql.contains(r#""email" = 'john@gmail.com'"#), "{sql}");
        assert!(sql.contains(r#""age" = 21"#), "{sql}");
        assert!(sql.contains(r#""version" = "version" + 1"#), "{sql}");
        assert!(
            sql.ends_with(r#"WHERE "users"."id" = 7 AND "users"."version" = 3"#),
            "{sql}"
        );
        assert!(!sql.contains("created_at"), "{sql}");
    }

    #[test]
    fn test_page_orders_by_column_then_id() {
        let sql = postgres_sql(page_query(&Filters::new(3, 10, "-age")).unwrap());

        assert!(
            sql.ends_with(
                r#"ORDER BY "users"."age" DESC, "users"."id" ASC LIMIT 10 OFFSET 20"#
            ),
            "{sql}"
        );
    }

    #[test]
    fn test_page_ascending_default() {
        let sql = postgres_sql(page_query(&Filters::default()).unwrap());

        assert!(
            sql.ends_with(r#"ORDER BY "users"."id" ASC, "users"."id" ASC LIMIT 20 OFFSET 0"#),
            "{sql}"
        );
    }

    #[test]
    fn test_page_rejects_unmapped_column() {
        let err = page_query(&Filters::new(1, 10, "password")).unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn test_page_reads_one_snapshot() {
        let (isolation, access) = page_snapshot();
        assert!(matches!(isolation, Some(IsolationLevel::RepeatableRead)));
        assert!(matches!(access, Some(AccessMode::ReadOnly)));
    }

    #[test]
    fn test_delete_locks_row() {
        let sql = postgres_sql(locked_row(5));

        assert!(sql.contains(r#"WHERE "users"."id" = 5"#), "{sql}");
        assert!(sql.ends_with("FOR UPDATE"), "{sql}");
    }
}
