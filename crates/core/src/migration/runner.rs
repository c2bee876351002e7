//! Migration runner.
//!
//! Applies pending steps in ascending order and reverses applied steps in
//! descending order. Each step runs in its own store transaction together
//! with its ledger update, and the whole run holds the store's migration lock.

use std::future::Future;

use chrono::{DateTime, Utc};
use stint_shared::MigrationId;
use tracing::{debug, error, info, warn};

use super::error::{MigrationError, StepError};
use super::registry::MigrationRegistry;
use super::step::{Migration, Reversal};
use super::store::{LedgerEntry, MigrationLedger, SchemaStore};

const DEFAULT_LOCK_HOLDER: &str = "stint-migrator";

/// Which applied steps a rollback reverses.
#[derive(Debug, Clone, Copy)]
enum RollbackScope {
    /// Every step newer than the given one (all when `None`).
    After(Option<MigrationId>),
    /// The given number of most recent steps.
    Latest(usize),
}

/// Steps applied by one `apply` call, in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedSet {
    applied: Vec<MigrationId>,
}

impl AppliedSet {
    /// Applied identifiers in ascending order.
    #[must_use]
    pub fn ids(&self) -> &[MigrationId] {
        &self.applied
    }

    /// Returns true if the step was applied by this call.
    #[must_use]
    pub fn contains(&self, id: MigrationId) -> bool {
        self.applied.contains(&id)
    }

    /// Number of applied steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.applied.len()
    }

    /// Returns true if nothing was pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Outcome of a `rollback` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackReport {
    /// Steps removed from the ledger, in descending order.
    pub reverted: Vec<MigrationId>,
    /// Steps whose reverse action was a no-op; their effect remains.
    pub irreversible: Vec<MigrationId>,
}

/// Status of one registered step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepStatus {
    /// Step identifier.
    pub id: MigrationId,
    /// Step name.
    pub name: String,
    /// When the step was applied, if it was.
    pub applied_at: Option<DateTime<Utc>>,
}

/// Applied and pending steps as seen by the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Registered steps in ascending order.
    pub steps: Vec<StepStatus>,
    /// Ledger entries with no registered step.
    pub orphaned: Vec<LedgerEntry>,
}

impl MigrationStatus {
    /// Iterates over applied steps.
    pub fn applied(&self) -> impl Iterator<Item = &StepStatus> {
        self.steps.iter().filter(|step| step.applied_at.is_some())
    }

    /// Iterates over pending steps.
    pub fn pending(&self) -> impl Iterator<Item = &StepStatus> {
        self.steps.iter().filter(|step| step.applied_at.is_none())
    }
}

/// Runs the steps of a registry against a store.
#[derive(Debug)]
pub struct Migrator<'r> {
    registry: &'r MigrationRegistry,
    lock_holder: String,
}

impl<'r> Migrator<'r> {
    /// Creates a runner over a registry.
    #[must_use]
    pub fn new(registry: &'r MigrationRegistry) -> Self {
        Self {
            registry,
            lock_holder: DEFAULT_LOCK_HOLDER.to_string(),
        }
    }

    /// Sets the name recorded while this runner holds the lock.
    #[must_use]
    pub fn with_lock_holder(mut self, holder: impl Into<String>) -> Self {
        self.lock_holder = holder.into();
        self
    }

    /// Applies every pending step in ascending identifier order.
    ///
    /// Each step and its ledger entry are committed together. On the first
    /// failure the run stops and the ledger keeps every step committed so far.
    ///
    /// # Errors
    ///
    /// Returns `LockContention` if the lock is held, `MigrationFailed` naming
    /// the failed step, or a store error while reading the ledger.
    pub async fn apply(&self, store: &dyn SchemaStore) -> Result<AppliedSet, MigrationError> {
        self.with_lock(store, self.apply_pending(store)).await
    }

    /// Reverses every applied step newer than `to` (all steps when `None`),
    /// newest first.
    ///
    /// # Errors
    ///
    /// Returns `LockContention` if the lock is held, `UnknownMigration` if an
    /// applied step is not registered (checked before any change), or
    /// `MigrationFailed` naming the step whose reverse action failed.
    pub async fn rollback(
        &self,
        store: &dyn SchemaStore,
        to: Option<MigrationId>,
    ) -> Result<RollbackReport, MigrationError> {
        self.with_lock(store, self.revert(store, RollbackScope::After(to)))
            .await
    }

    /// Reverses the `count` most recent applied steps, newest first.
    ///
    /// # Errors
    ///
    /// Same as [`Migrator::rollback`].
    pub async fn rollback_last(
        &self,
        store: &dyn SchemaStore,
        count: usize,
    ) -> Result<RollbackReport, MigrationError> {
        self.with_lock(store, self.revert(store, RollbackScope::Latest(count)))
            .await
    }

    /// Returns the identifiers that `apply` would run, in order.
    ///
    /// # Errors
    ///
    /// Returns a store error if the ledger cannot be read.
    pub async fn pending(&self, store: &dyn SchemaStore) -> Result<Vec<MigrationId>, MigrationError> {
        let ledger = store.read_ledger().await?;
        Ok(self
            .registry
            .ids()
            .filter(|id| !ledger.contains(*id))
            .collect())
    }

    /// Reports applied, pending and orphaned steps.
    ///
    /// # Errors
    ///
    /// Returns a store error if the ledger cannot be read.
    pub async fn status(&self, store: &dyn SchemaStore) -> Result<MigrationStatus, MigrationError> {
        let ledger = store.read_ledger().await?;

        let steps = self
            .registry
            .iter()
            .map(|step| StepStatus {
                id: step.id(),
                name: step.name().to_string(),
                applied_at: ledger.get(step.id()).map(|entry| entry.applied_at),
            })
            .collect();

        let orphaned = ledger
            .entries()
            .filter(|entry| !self.registry.contains(entry.id))
            .cloned()
            .collect();

        Ok(MigrationStatus { steps, orphaned })
    }

    async fn with_lock<T>(
        &self,
        store: &dyn SchemaStore,
        work: impl Future<Output = Result<T, MigrationError>>,
    ) -> Result<T, MigrationError> {
        if !store.try_lock(&self.lock_holder).await? {
            return Err(MigrationError::LockContention);
        }
        debug!(holder = %self.lock_holder, "Acquired migration lock");

        let result = work.await;

        match store.unlock(&self.lock_holder).await {
            Ok(()) => {
                debug!(holder = %self.lock_holder, "Released migration lock");
                result
            }
            Err(e) => {
                error!(error = %e, holder = %self.lock_holder, "Failed to release migration lock");
                // The run's own error takes precedence over the unlock failure.
                match result {
                    Ok(_) => Err(MigrationError::Store(e)),
                    Err(err) => Err(err),
                }
            }
        }
    }

    async fn apply_pending(&self, store: &dyn SchemaStore) -> Result<AppliedSet, MigrationError> {
        let ledger = store.read_ledger().await?;
        self.warn_orphaned(&ledger);

        let mut applied = AppliedSet::default();
        for step in self.registry.iter().filter(|step| !ledger.contains(step.id())) {
            let step_id = step.id();
            apply_step(store, step)
                .await
                .map_err(|cause| MigrationError::MigrationFailed { step_id, cause })?;

            info!(step_id = %step_id, name = %step.name(), "Applied migration");
            applied.applied.push(step_id);
        }

        if applied.is_empty() {
            info!("No pending migrations");
        }
        Ok(applied)
    }

    async fn revert(
        &self,
        store: &dyn SchemaStore,
        scope: RollbackScope,
    ) -> Result<RollbackReport, MigrationError> {
        let ledger = store.read_ledger().await?;

        let newest_first = ledger.ids().rev();
        let ids: Vec<MigrationId> = match scope {
            RollbackScope::After(to) => newest_first
                .filter(|id| to.is_none_or(|to| *id > to))
                .collect(),
            RollbackScope::Latest(count) => newest_first.take(count).collect(),
        };

        let mut targets = Vec::with_capacity(ids.len());
        for id in ids {
            let step = self
                .registry
                .get(id)
                .ok_or(MigrationError::UnknownMigration(id))?;
            targets.push(step);
        }

        let mut report = RollbackReport::default();
        for step in targets {
            let step_id = step.id();
            let reversal = revert_step(store, step)
                .await
                .map_err(|cause| MigrationError::MigrationFailed { step_id, cause })?;

            match reversal {
                Reversal::Reversed => {
                    info!(step_id = %step_id, name = %step.name(), "Reverted migration");
                }
                Reversal::Noop => {
                    warn!(
                        step_id = %step_id,
                        name = %step.name(),
                        "Migration has no reverse action; its schema changes remain"
                    );
                    report.irreversible.push(step_id);
                }
            }
            report.reverted.push(step_id);
        }

        Ok(report)
    }

    fn warn_orphaned(&self, ledger: &MigrationLedger) {
        for entry in ledger.entries().filter(|entry| !self.registry.contains(entry.id)) {
            warn!(
                step_id = %entry.id,
                name = %entry.name,
                "Ledger records a migration that is not registered"
            );
        }
    }
}

async fn apply_step(store: &dyn SchemaStore, step: &dyn Migration) -> Result<(), StepError> {
    let mut tx = store.begin().await?;
    step.up(tx.as_mut()).await?;
    tx.append_ledger(step.id(), step.name()).await?;
    tx.commit().await?;
    Ok(())
}

async fn revert_step(store: &dyn SchemaStore, step: &dyn Migration) -> Result<Reversal, StepError> {
    let mut tx = store.begin().await?;
    let reversal = step.down(tx.as_mut()).await?;
    tx.remove_ledger(step.id()).await?;
    tx.commit().await?;
    Ok(reversal)
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
