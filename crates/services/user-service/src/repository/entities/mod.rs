//! SeaORM entities backing the repositories.

pub mod user;
