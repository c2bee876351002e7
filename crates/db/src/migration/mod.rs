//! Store table migrations.
//!
//! These create the tables [`DbSchemaStore`](crate::DbSchemaStore) writes to
//! and are managed using sea-orm-migration, separately from the collection
//! migrations the store records in its own ledger.

pub use sea_orm_migration::prelude::*;

mod m20260201_000001_store_tables;

/// Migrator for the store's own tables.
pub struct StoreMigrator;

#[async_trait::async_trait]
impl MigratorTrait for StoreMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260201_000001_store_tables::Migration)]
    }
}
