//! `SeaORM` entities for the schema store tables.

pub mod collections;
pub mod migration_lock;
pub mod migrations;
