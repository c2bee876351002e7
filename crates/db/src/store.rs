//! SQL-backed schema store.
//!
//! Collection definitions are stored as JSON documents in `_collections`,
//! applied steps in `_migrations`, and the migration lock as a single row of
//! `_migration_lock`. Each store transaction is a database transaction, so a
//! step's schema writes and its ledger entry commit or roll back together.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use stint_core::migration::{
    LedgerEntry, MigrationLedger, SchemaStore, SchemaTransaction, StoreError,
};
use stint_core::schema::{CollectionDefinition, SchemaChange};
use stint_shared::MigrationId;
use stint_shared::config::DatabaseConfig;
use tracing::debug;

use crate::entities::migration_lock::LOCK_ROW_ID;
use crate::entities::{collections, migration_lock, migrations};
use crate::migration::StoreMigrator;

/// Schema store over a `SeaORM` connection.
#[derive(Debug, Clone)]
pub struct DbSchemaStore {
    db: DatabaseConnection,
}

impl DbSchemaStore {
    /// Wraps a connection whose store tables already exist.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Connects to the configured database and creates the store tables if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or the table migration fails.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let db = crate::connect(config).await?;
        let store = Self::new(db);
        store.bootstrap().await?;
        Ok(store)
    }

    /// Creates the store tables if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the table migration fails.
    pub async fn bootstrap(&self) -> Result<(), DbErr> {
        StoreMigrator::up(&self.db, None).await
    }

    /// Returns the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Returns the current lock holder, if the lock is held.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock row cannot be read.
    pub async fn lock_holder(&self) -> Result<Option<String>, StoreError> {
        let row = migration_lock::Entity::find_by_id(LOCK_ROW_ID)
            .one(&self.db)
            .await
            .map_err(backend)?;
        Ok(row.map(|row| row.holder))
    }

    /// Removes the migration lock, whoever holds it.
    ///
    /// Clears a lock left behind by a crashed run. Returns the holder that
    /// was removed, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock row cannot be read or deleted.
    pub async fn force_unlock(&self) -> Result<Option<String>, StoreError> {
        let holder = self.lock_holder().await?;
        migration_lock::Entity::delete_many()
            .exec(&self.db)
            .await
            .map_err(backend)?;
        Ok(holder)
    }
}

#[async_trait]
impl SchemaStore for DbSchemaStore {
    async fn try_lock(&self, holder: &str) -> Result<bool, StoreError> {
        let lock = migration_lock::ActiveModel {
            id: Set(LOCK_ROW_ID),
            holder: Set(holder.to_string()),
            locked_at: Set(Utc::now()),
        };

        let inserted = migration_lock::Entity::insert(lock)
            .on_conflict(
                OnConflict::column(migration_lock::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(backend)?;

        Ok(inserted == 1)
    }

    async fn unlock(&self, holder: &str) -> Result<(), StoreError> {
        migration_lock::Entity::delete_many()
            .filter(migration_lock::Column::Holder.eq(holder))
            .exec(&self.db)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn read_ledger(&self) -> Result<MigrationLedger, StoreError> {
        load_ledger(&self.db).await
    }

    async fn collections(&self) -> Result<Vec<CollectionDefinition>, StoreError> {
        load_collections(&self.db).await
    }

    async fn begin<'a>(&'a self) -> Result<Box<dyn SchemaTransaction + 'a>, StoreError> {
        let txn = self.db.begin().await.map_err(backend)?;
        Ok(Box::new(DbSchemaTransaction { txn }))
    }
}

/// A unit of work over one database transaction.
///
/// Dropping it without calling `commit` rolls the transaction back.
struct DbSchemaTransaction {
    txn: DatabaseTransaction,
}

#[async_trait]
impl SchemaTransaction for DbSchemaTransaction {
    async fn collections(&mut self) -> Result<Vec<CollectionDefinition>, StoreError> {
        load_collections(&self.txn).await
    }

    async fn apply_schema_change(&mut self, change: &SchemaChange) -> Result<(), StoreError> {
        match change {
            SchemaChange::Upsert(collection) => upsert_collection(&self.txn, collection).await,
            SchemaChange::Delete(id) => {
                collections::Entity::delete_by_id(id.as_str())
                    .exec(&self.txn)
                    .await
                    .map_err(backend)?;
                debug!(collection_id = %id, "Deleted collection");
                Ok(())
            }
        }
    }

    async fn append_ledger(&mut self, id: MigrationId, name: &str) -> Result<(), StoreError> {
        let entry = migrations::ActiveModel {
            id: Set(ledger_key(id)?),
            name: Set(name.to_string()),
            applied_at: Set(Utc::now()),
        };

        migrations::Entity::insert(entry)
            .on_conflict(
                OnConflict::column(migrations::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.txn)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn remove_ledger(&mut self, id: MigrationId) -> Result<(), StoreError> {
        migrations::Entity::delete_by_id(ledger_key(id)?)
            .exec(&self.txn)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.txn.commit().await.map_err(backend)
    }
}

async fn upsert_collection<C: ConnectionTrait>(
    db: &C,
    collection: &CollectionDefinition,
) -> Result<(), StoreError> {
    let definition = serde_json::to_string(collection).map_err(serialization)?;
    let now = Utc::now();

    let existing = collections::Entity::find_by_id(collection.id.as_str())
        .one(db)
        .await
        .map_err(backend)?;

    if let Some(row) = existing {
        let mut active: collections::ActiveModel = row.into();
        active.name = Set(collection.name.clone());
        active.definition = Set(definition);
        active.updated_at = Set(now);
        active.update(db).await.map_err(backend)?;
        debug!(collection_id = %collection.id, name = %collection.name, "Updated collection");
        return Ok(());
    }

    let position = collections::Entity::find()
        .order_by_desc(collections::Column::Position)
        .one(db)
        .await
        .map_err(backend)?
        .map_or(0, |last| last.position + 1);

    let row = collections::ActiveModel {
        id: Set(collection.id.to_string()),
        name: Set(collection.name.clone()),
        position: Set(position),
        definition: Set(definition),
        updated_at: Set(now),
    };
    collections::Entity::insert(row)
        .exec_without_returning(db)
        .await
        .map_err(backend)?;
    debug!(collection_id = %collection.id, name = %collection.name, "Created collection");
    Ok(())
}

async fn load_collections<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<CollectionDefinition>, StoreError> {
    collections::Entity::find()
        .order_by_asc(collections::Column::Position)
        .all(db)
        .await
        .map_err(backend)?
        .into_iter()
        .map(|row| serde_json::from_str(&row.definition).map_err(serialization))
        .collect()
}

async fn load_ledger<C: ConnectionTrait>(db: &C) -> Result<MigrationLedger, StoreError> {
    migrations::Entity::find()
        .order_by_asc(migrations::Column::Id)
        .all(db)
        .await
        .map_err(backend)?
        .into_iter()
        .map(|row| -> Result<LedgerEntry, StoreError> {
            let id = MigrationId::try_from(row.id).map_err(serialization)?;
            Ok(LedgerEntry {
                id,
                name: row.name,
                applied_at: row.applied_at,
            })
        })
        .collect()
}

fn ledger_key(id: MigrationId) -> Result<i64, StoreError> {
    i64::try_from(id).map_err(serialization)
}

#[allow(clippy::needless_pass_by_value)]
fn backend(err: DbErr) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[allow(clippy::needless_pass_by_value)]
fn serialization(err: impl std::fmt::Display) -> StoreError {
    StoreError::Serialization(err.to_string())
}
