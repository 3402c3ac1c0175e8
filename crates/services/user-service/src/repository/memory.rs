//! In-memory implementation of UserRepository (for development/testing).

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use common::{AppError, AppResult};
use domain::{Filters, MetaData, SortDirection, User, INITIAL_VERSION};

use super::UserRepository;

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    users: BTreeMap<i64, User>,
}

/// Arena of users keyed by id behind a single mutex.
///
/// Every operation takes the lock for its whole read-modify-write, which gives
/// `update` and `delete_by_id` the same atomicity a conditional SQL statement
/// gives [`super::UserStore`].
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    state: Mutex<State>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn comparator(column: &str) -> Option<fn(&User, &User) -> Ordering> {
    match column {
        "id" => Some(|a: &User, b: &User| a.id.cmp(&b.id)),
        "name" => Some(|a: &User, b: &User| a.name.cmp(&b.name)),
        "email" => Some(|a: &User, b: &User| a.email.cmp(&b.email)),
        "age" => Some(|a: &User, b: &User| a.age.cmp(&b.age)),
        "created_at" => Some(|a: &User, b: &User| a.created_at.cmp(&b.created_at)),
        _ => None,
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn create(&self, mut user: User) -> AppResult<User> {
        let mut state = self.state.lock().await;

        state.next_id += 1;
        user.id = state.next_id;
        user.created_at = Utc::now();
        user.version = INITIAL_VERSION;
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<User> {
        let state = self.state.lock().await;
        state.users.get(&id).cloned().ok_or(AppError::NotFound)
    }

    async fn get_all(&self, filters: &Filters) -> AppResult<(Vec<User>, MetaData)> {
        let compare = comparator(filters.sort_column()).ok_or_else(|| {
            AppError::internal(format!("unmapped sort column {}", filters.sort_column()))
        })?;
        let direction = filters.sort_direction();

        let state = self.state.lock().await;
        let total = state.users.len() as u64;

        let mut users: Vec<User> = state.users.values().cloned().collect();
        drop(state);

        users.sort_by(|a, b| {
            let primary = match direction {
                SortDirection::Asc => compare(a, b),
                SortDirection::Desc => compare(b, a),
            };
            primary.then_with(|| a.id.cmp(&b.id))
        });

        let offset = usize::try_from(filters.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(filters.limit()).unwrap_or(usize::MAX);
        let page = users.into_iter().skip(offset).take(limit).collect();

        Ok((page, MetaData::for_filters(total, filters)))
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<User> {
        let mut state = self.state.lock().await;
        state.users.remove(&id).ok_or(AppError::NotFound)
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let mut state = self.state.lock().await;

        match state.users.get_mut(&user.id) {
            Some(stored) if stored.version == user.version => {
                stored.name = user.name;
                stored.email = user.email;
                stored.age = user.age;
                stored.version += 1;
                Ok(stored.clone())
            }
            _ => Err(AppError::EditConflict),
        }
    }
}
