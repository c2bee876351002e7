//! Schema error types.
//!
//! Every schema error is a configuration bug detected before any mutation,
//! so none of them is retryable.

use stint_shared::CollectionId;
use thiserror::Error;

/// Errors raised while validating or planning schema changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    // ========== Definition Errors ==========
    /// Two fields of a collection share a name or ID.
    #[error("Collection '{collection}' has duplicate field '{field}'")]
    DuplicateField {
        /// Collection name.
        collection: String,
        /// Duplicated field name or ID.
        field: String,
    },

    /// The collection has zero or several primary keys, or a malformed one.
    #[error("Collection '{collection}' has an invalid primary key: {reason}")]
    InvalidPrimaryKey {
        /// Collection name.
        collection: String,
        /// What is wrong with the primary key.
        reason: String,
    },

    /// A field constraint is inconsistent.
    #[error("Field '{collection}.{field}' has an invalid constraint: {reason}")]
    InvalidConstraint {
        /// Collection name.
        collection: String,
        /// Field name.
        field: String,
        /// What is wrong with the constraint.
        reason: String,
    },

    /// A collection or field name is empty or malformed.
    #[error("Invalid name '{0}'")]
    InvalidName(String),

    /// The schema document could not be parsed.
    #[error("Invalid schema document: {0}")]
    InvalidDocument(String),

    // ========== Snapshot Errors ==========
    /// A relation targets a collection that does not exist.
    #[error("Field '{collection}.{field}' references unknown collection '{target}'")]
    UnresolvedReference {
        /// Collection name.
        collection: String,
        /// Relation field name.
        field: String,
        /// Missing target collection ID.
        target: CollectionId,
    },

    /// Two collections share a name.
    #[error("Collection name '{0}' is already in use")]
    DuplicateCollection(String),

    /// A change targets a collection that does not exist.
    #[error("Collection not found: {0}")]
    UnknownCollection(CollectionId),

    /// An immutable field (the primary key) was altered.
    #[error("Field '{collection}.{field}' cannot be changed once created")]
    ImmutableField {
        /// Collection name.
        collection: String,
        /// Field name.
        field: String,
    },

    /// A system collection was deleted.
    #[error("System collection '{0}' cannot be deleted")]
    ProtectedCollection(String),
}

impl SchemaError {
    /// Returns the stable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateField { .. } => "DUPLICATE_FIELD",
            Self::InvalidPrimaryKey { .. } => "INVALID_PRIMARY_KEY",
            Self::InvalidConstraint { .. } => "INVALID_CONSTRAINT",
            Self::InvalidName(_) => "INVALID_NAME",
            Self::InvalidDocument(_) => "INVALID_DOCUMENT",
            Self::UnresolvedReference { .. } => "UNRESOLVED_REFERENCE",
            Self::DuplicateCollection(_) => "DUPLICATE_COLLECTION",
            Self::UnknownCollection(_) => "UNKNOWN_COLLECTION",
            Self::ImmutableField { .. } => "IMMUTABLE_FIELD",
            Self::ProtectedCollection(_) => "PROTECTED_COLLECTION",
        }
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidDocument(err.to_string())
    }
}
