//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::User;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i32,
    /// Filled by the column default on insert
    pub created_at: DateTimeUtc,
    /// Optimistic concurrency token, starts at 1
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            id: model.id,
            name: model.name,
            email: model.email,
            age: model.age,
            created_at: model.created_at,
            version: model.version,
        }
    }
}

impl Column {
    /// Map a validated sort key onto its column.
    pub fn from_sort_key(key: &str) -> Option<Self> {
        match key {
            "id" => Some(Column::Id),
            "name" => Some(Column::Name),
            "email" => Some(Column::Email),
            "age" => Some(Column::Age),
            "created_at" => Some(Column::CreatedAt),
            _ => None,
        }
    }
}
