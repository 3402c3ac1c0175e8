//! User Service Library
//!
//! This crate provides user management via gRPC: validated creation, paged
//! listing, deletion, and partial updates guarded by a per-record version.
//! Storage is either PostgreSQL or an in-process map, picked at startup.

pub mod config;
pub mod grpc;
pub mod infra;
pub mod repository;
pub mod service;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tonic::transport::Server;
use tracing::info;

use crate::config::UserServiceConfig;
use crate::grpc::UserGrpcService;
use crate::infra::Database;
use crate::repository::{InMemoryUserStore, UserRepository, UserStore};
use crate::service::UserManager;

/// Backing store for the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Wire a repository into the gRPC service stack.
pub fn grpc_service(
    repo: Arc<dyn UserRepository>,
    storage_timeout: Duration,
) -> proto::UserServiceServer<UserGrpcService> {
    let user_service = Arc::new(UserManager::with_timeout(repo, storage_timeout));
    proto::UserServiceServer::new(UserGrpcService::new(user_service))
}

/// Run the gRPC server until it fails.
pub async fn run_server(
    config: UserServiceConfig,
    store: StoreKind,
) -> Result<(), Box<dyn std::error::Error>> {
    let repo = open_repository(&config, store).await?;

    // Build address
    let addr: SocketAddr = format!("{}:{}", config.service.host, config.service.port).parse()?;
    info!(%addr, ?store, "{} listening", config.service.service_name);

    // Run server
    Server::builder()
        .add_service(grpc_service(repo, config.storage_timeout()))
        .serve(addr)
        .await?;

    Ok(())
}

async fn open_repository(
    config: &UserServiceConfig,
    store: StoreKind,
) -> Result<Arc<dyn UserRepository>, Box<dyn std::error::Error>> {
    match store {
        StoreKind::Postgres => {
            let db = Database::connect(&config.database).await?;
            db.ping().await?;
            Ok(Arc::new(UserStore::new(db.get_connection())))
        }
        StoreKind::Memory => {
            info!("Using in-memory user store; data is lost on exit");
            Ok(Arc::new(InMemoryUserStore::new()))
        }
    }
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(
    config: &UserServiceConfig,
    action: MigrateAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}
