//! `SeaORM` Entity for the `_migration_lock` table.
//!
//! The table holds at most one row; its presence means a runner holds the lock.

use sea_orm::entity::prelude::*;

/// Primary key of the single lock row.
pub const LOCK_ROW_ID: i32 = 1;

/// The migration lock row.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "_migration_lock")]
pub struct Model {
    /// Always [`LOCK_ROW_ID`].
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    /// Name of the process holding the lock.
    pub holder: String,
    /// When the lock was taken.
    pub locked_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
