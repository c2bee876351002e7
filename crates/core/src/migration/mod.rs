//! Schema migration engine.
//!
//! This module implements versioned schema evolution:
//! - Migration steps with forward and reverse actions
//! - An explicit, ordered registry of steps
//! - The runner applying, reverting and reporting steps
//! - The store seam and an in-memory store
//! - Error types for migration operations

pub mod error;
pub mod memory;
pub mod registry;
pub mod runner;
pub mod step;
pub mod store;

#[cfg(test)]
mod registry_props;

pub use error::{MigrationError, StepError, StoreError};
pub use memory::MemorySchemaStore;
pub use registry::MigrationRegistry;
pub use runner::{AppliedSet, MigrationStatus, Migrator, RollbackReport, StepStatus};
pub use step::{Migration, Reversal, SchemaAction, SchemaMigration, apply_changes};
pub use store::{LedgerEntry, MigrationLedger, SchemaStore, SchemaTransaction};
pub use stint_shared::MigrationId;
