//! In-memory schema store.
//!
//! Transactions work on a private copy of the state and hold the state mutex
//! until they commit or drop, so units of work never interleave.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use stint_shared::MigrationId;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::error::StoreError;
use super::store::{LedgerEntry, MigrationLedger, SchemaStore, SchemaTransaction};
use crate::schema::{CollectionDefinition, SchemaChange};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    collections: Vec<CollectionDefinition>,
    ledger: BTreeMap<MigrationId, LedgerEntry>,
}

/// A schema store kept in process memory.
#[derive(Debug, Default)]
pub struct MemorySchemaStore {
    state: Arc<Mutex<MemoryState>>,
    lock: Mutex<Option<String>>,
}

impl MemorySchemaStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds some collections.
    #[must_use]
    pub fn with_collections(collections: Vec<CollectionDefinition>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                collections,
                ledger: BTreeMap::new(),
            })),
            lock: Mutex::new(None),
        }
    }

    /// Returns the current lock holder.
    pub async fn lock_holder(&self) -> Option<String> {
        self.lock.lock().await.clone()
    }

    /// Releases the migration lock, whoever holds it.
    pub async fn force_unlock(&self) {
        self.lock.lock().await.take();
    }
}

#[async_trait]
impl SchemaStore for MemorySchemaStore {
    async fn try_lock(&self, holder: &str) -> Result<bool, StoreError> {
        let mut lock = self.lock.lock().await;
        if lock.is_some() {
            return Ok(false);
        }
        *lock = Some(holder.to_string());
        Ok(true)
    }

    async fn unlock(&self, holder: &str) -> Result<(), StoreError> {
        let mut lock = self.lock.lock().await;
        if lock.as_deref() == Some(holder) {
            lock.take();
        }
        Ok(())
    }

    async fn read_ledger(&self) -> Result<MigrationLedger, StoreError> {
        let state = self.state.lock().await;
        Ok(state.ledger.values().cloned().collect())
    }

    async fn collections(&self) -> Result<Vec<CollectionDefinition>, StoreError> {
        Ok(self.state.lock().await.collections.clone())
    }

    async fn begin<'a>(&'a self) -> Result<Box<dyn SchemaTransaction + 'a>, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }
}

struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl SchemaTransaction for MemoryTransaction {
    async fn collections(&mut self) -> Result<Vec<CollectionDefinition>, StoreError> {
        Ok(self.working.collections.clone())
    }

    async fn apply_schema_change(&mut self, change: &SchemaChange) -> Result<(), StoreError> {
        let collections = &mut self.working.collections;
        match change {
            SchemaChange::Upsert(collection) => {
                match collections.iter_mut().find(|c| c.id == collection.id) {
                    Some(existing) => *existing = collection.clone(),
                    None => collections.push(collection.clone()),
                }
            }
            SchemaChange::Delete(id) => collections.retain(|c| &c.id != id),
        }
        Ok(())
    }

    async fn append_ledger(&mut self, id: MigrationId, name: &str) -> Result<(), StoreError> {
        self.working.ledger.entry(id).or_insert_with(|| LedgerEntry {
            id,
            name: name.to_string(),
            applied_at: Utc::now(),
        });
        Ok(())
    }

    async fn remove_ledger(&mut self, id: MigrationId) -> Result<(), StoreError> {
        self.working.ledger.remove(&id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let Self { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
