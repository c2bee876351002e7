//! Store tables migration.
//!
//! Creates the collection snapshot, the migration ledger and the lock table.
//! Built with the schema builder so the same migration runs on `PostgreSQL`
//! and `SQLite`.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Collections::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Collections::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Collections::Name).string().not_null())
                    .col(ColumnDef::new(Collections::Position).integer().not_null())
                    .col(ColumnDef::new(Collections::Definition).text().not_null())
                    .col(
                        ColumnDef::new(Collections::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Migrations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Migrations::Id).big_integer().not_null().primary_key())
                    .col(ColumnDef::new(Migrations::Name).string().not_null())
                    .col(
                        ColumnDef::new(Migrations::AppliedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MigrationLock::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MigrationLock::Id).integer().not_null().primary_key())
                    .col(ColumnDef::new(MigrationLock::Holder).string().not_null())
                    .col(
                        ColumnDef::new(MigrationLock::LockedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MigrationLock::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Migrations::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Collections::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Collections {
    #[sea_orm(iden = "_collections")]
    Table,
    Id,
    Name,
    Position,
    Definition,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Migrations {
    #[sea_orm(iden = "_migrations")]
    Table,
    Id,
    Name,
    AppliedAt,
}

#[derive(DeriveIden)]
enum MigrationLock {
    #[sea_orm(iden = "_migration_lock")]
    Table,
    Id,
    Holder,
    LockedAt,
}
