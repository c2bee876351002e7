//! SQL persistence for the schema migration engine.
//!
//! This crate provides:
//! - `SeaORM` entities for the store tables
//! - The internal migration creating those tables
//! - [`DbSchemaStore`], a [`SchemaStore`](stint_core::migration::SchemaStore)
//!   over `PostgreSQL` or `SQLite`
//! - The application's registered collection migrations

pub mod collections;
pub mod entities;
pub mod migration;
pub mod store;

pub use store::DbSchemaStore;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use stint_shared::config::DatabaseConfig;

/// Establishes a connection pool to the configured database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);

    Database::connect(options).await
}
