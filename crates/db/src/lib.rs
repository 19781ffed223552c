//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//! - Row-level security helpers for tenant isolation

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod rls;

pub use repositories::{
    AlertRepository, AuditRepository, CostAllocationRepository, LineItemRepository,
    MaterialRepository, OrganizationRepository, ProjectRepository, SessionRepository,
    UserRepository,
};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Opens a connection pool against the given database URL.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(
    database_url: &str,
    max_connections: u32,
    min_connections: u32,
) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(max_connections)
        .min_connections(min_connections);
    Database::connect(options).await
}
