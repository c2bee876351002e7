//! Migration error types.
//!
//! This module defines the errors of the migration registry and runner,
//! the errors stores report, and the cause attached to a failed step.

use stint_shared::MigrationId;
use thiserror::Error;

use crate::schema::SchemaError;

/// Errors reported by a schema store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The underlying storage failed.
    #[error("Store backend error: {0}")]
    Backend(String),

    /// A stored value could not be encoded or decoded.
    #[error("Store serialization error: {0}")]
    Serialization(String),
}

/// Why a single migration step failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    /// The step produced an invalid schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The store failed while the step ran.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors that can occur while building a registry or running migrations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationError {
    // ========== Configuration Errors ==========
    /// Two steps share an identifier.
    #[error("Duplicate migration id: {0}")]
    DuplicateMigrationId(MigrationId),

    /// A step's schema definition is invalid.
    #[error("Invalid migration definition: {0}")]
    Schema(#[from] SchemaError),

    /// The ledger records a step the registry does not know.
    #[error("Migration {0} is recorded as applied but is not registered")]
    UnknownMigration(MigrationId),

    // ========== Run Errors ==========
    /// A step failed; the ledger is left as of the previous step.
    #[error("Migration {step_id} failed: {cause}")]
    MigrationFailed {
        /// The step that failed.
        step_id: MigrationId,
        /// The underlying failure.
        #[source]
        cause: StepError,
    },

    /// Another process holds the migration lock.
    #[error("Migration lock is held by another process")]
    LockContention,

    /// The store failed outside of any step.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MigrationError {
    /// Returns the stable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateMigrationId(_) => "DUPLICATE_MIGRATION_ID",
            Self::Schema(err) => err.error_code(),
            Self::UnknownMigration(_) => "UNKNOWN_MIGRATION",
            Self::MigrationFailed { .. } => "MIGRATION_FAILED",
            Self::LockContention => "LOCK_CONTENTION",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// Returns the failed step, if the error happened inside one.
    #[must_use]
    pub fn step_id(&self) -> Option<MigrationId> {
        match self {
            Self::MigrationFailed { step_id, .. } => Some(*step_id),
            _ => None,
        }
    }

    /// Returns true if the caller may retry the same call later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockContention)
    }
}
