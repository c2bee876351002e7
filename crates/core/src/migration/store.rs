//! Store seam consumed by the migration runner.
//!
//! A store persists collection definitions, the migration ledger and the
//! migration lock. Every mutation happens inside a [`SchemaTransaction`];
//! dropping a transaction without committing discards its changes.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stint_shared::MigrationId;

use super::error::StoreError;
use crate::schema::{CollectionDefinition, SchemaChange};

/// A target store for schema migrations.
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Tries to take the exclusive migration lock for `holder`.
    ///
    /// Returns `false` if the lock is already held.
    async fn try_lock(&self, holder: &str) -> Result<bool, StoreError>;

    /// Releases the migration lock if `holder` holds it.
    ///
    /// A lock taken over by another holder is left in place.
    async fn unlock(&self, holder: &str) -> Result<(), StoreError>;

    /// Reads the applied migrations.
    async fn read_ledger(&self) -> Result<MigrationLedger, StoreError>;

    /// Reads the current collection definitions.
    async fn collections(&self) -> Result<Vec<CollectionDefinition>, StoreError>;

    /// Starts a unit of work.
    async fn begin<'a>(&'a self) -> Result<Box<dyn SchemaTransaction + 'a>, StoreError>;
}

/// A unit of work against a schema store.
#[async_trait]
pub trait SchemaTransaction: Send {
    /// Reads the collection definitions as seen by this transaction.
    async fn collections(&mut self) -> Result<Vec<CollectionDefinition>, StoreError>;

    /// Applies one schema change.
    async fn apply_schema_change(&mut self, change: &SchemaChange) -> Result<(), StoreError>;

    /// Records a step as applied. Recording a present step is a no-op.
    async fn append_ledger(&mut self, id: MigrationId, name: &str) -> Result<(), StoreError>;

    /// Removes a step from the ledger.
    async fn remove_ledger(&mut self, id: MigrationId) -> Result<(), StoreError>;

    /// Makes every change of this transaction visible at once.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// One applied migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Step identifier.
    pub id: MigrationId,
    /// Step name at the time it was applied.
    pub name: String,
    /// When the step was applied.
    pub applied_at: DateTime<Utc>,
}

/// The set of applied migrations, ordered by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationLedger {
    entries: BTreeMap<MigrationId, LedgerEntry>,
}

impl MigrationLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the step has been applied.
    #[must_use]
    pub fn contains(&self, id: MigrationId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Returns the entry of an applied step.
    #[must_use]
    pub fn get(&self, id: MigrationId) -> Option<&LedgerEntry> {
        self.entries.get(&id)
    }

    /// Iterates over applied identifiers in ascending order.
    pub fn ids(&self) -> impl DoubleEndedIterator<Item = MigrationId> + '_ {
        self.entries.keys().copied()
    }

    /// Iterates over entries in ascending order.
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &LedgerEntry> {
        self.entries.values()
    }

    /// Returns the most recently created applied step.
    #[must_use]
    pub fn latest(&self) -> Option<&LedgerEntry> {
        self.entries.values().next_back()
    }

    /// Number of applied steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been applied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<LedgerEntry> for MigrationLedger {
    fn from_iter<I: IntoIterator<Item = LedgerEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|entry| (entry.id, entry)).collect(),
        }
    }
}
