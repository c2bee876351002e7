//! `SeaORM` Entity for the `_migrations` ledger table.

use sea_orm::entity::prelude::*;

/// An applied migration step.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "_migrations")]
pub struct Model {
    /// Step identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// Step name at the time it was applied.
    pub name: String,
    /// When the step was committed.
    pub applied_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
