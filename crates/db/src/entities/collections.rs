//! `SeaORM` Entity for the `_collections` table.

use sea_orm::entity::prelude::*;

/// A stored collection definition.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "_collections")]
pub struct Model {
    /// Collection id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Collection name, unique case-insensitively across the snapshot.
    ///
    /// Uniqueness is checked by the planner on the whole snapshot, not per
    /// row, so one step may swap names between collections.
    pub name: String,
    /// Creation order within the snapshot.
    pub position: i32,
    /// The full definition as a JSON document.
    #[sea_orm(column_type = "Text")]
    pub definition: String,
    /// Last write time.
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
