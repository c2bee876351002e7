//! Migration steps.
//!
//! A step is an immutable, versioned schema change with a forward and a
//! reverse action. Custom steps implement [`Migration`]; declarative steps use
//! [`SchemaMigration`].

use async_trait::async_trait;
use stint_shared::MigrationId;

use super::error::{MigrationError, StepError};
use super::store::SchemaTransaction;
use crate::schema::{
    CollectionDefinition, SchemaChange, SchemaPlan, import_changes, parse_collections,
    validate_collection,
};

/// Outcome of a reverse action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reversal {
    /// The forward action was undone.
    Reversed,
    /// Nothing was undone; the forward action's effect remains.
    Noop,
}

/// A versioned schema change.
#[async_trait]
pub trait Migration: Send + Sync {
    /// Unique, creation-ordered identifier.
    fn id(&self) -> MigrationId;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Applies the change.
    async fn up(&self, schema: &mut dyn SchemaTransaction) -> Result<(), StepError>;

    /// Undoes the change, or reports that it cannot.
    async fn down(&self, schema: &mut dyn SchemaTransaction) -> Result<Reversal, StepError>;
}

/// Plans `changes` against the transaction's schema and applies the effective ones.
///
/// Returns the number of changes written.
///
/// # Errors
///
/// Returns a schema error if the resulting schema is invalid, or the store
/// error of the first failed write.
pub async fn apply_changes(
    schema: &mut dyn SchemaTransaction,
    changes: Vec<SchemaChange>,
) -> Result<usize, StepError> {
    let existing = schema.collections().await?;
    let plan = SchemaPlan::build(&existing, changes)?;
    let changes = plan.into_changes();

    for change in &changes {
        schema.apply_schema_change(change).await?;
    }

    Ok(changes.len())
}

/// Declarative action of a [`SchemaMigration`].
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaAction {
    /// Apply these changes as given.
    Changes(Vec<SchemaChange>),
    /// Upsert these collections, optionally deleting the others.
    Import {
        /// Collections to upsert.
        collections: Vec<CollectionDefinition>,
        /// Delete existing non-system collections not listed.
        delete_missing: bool,
    },
}

impl SchemaAction {
    async fn run(&self, schema: &mut dyn SchemaTransaction) -> Result<usize, StepError> {
        match self {
            Self::Changes(changes) => apply_changes(schema, changes.clone()).await,
            Self::Import {
                collections,
                delete_missing,
            } => {
                let existing = schema.collections().await?;
                let changes = import_changes(&existing, collections.clone(), *delete_missing);
                apply_changes(schema, changes).await
            }
        }
    }
}

/// A step defined entirely by schema data.
#[derive(Debug, Clone)]
pub struct SchemaMigration {
    id: MigrationId,
    name: String,
    up: SchemaAction,
    down: Option<SchemaAction>,
}

impl SchemaMigration {
    /// Creates a step from explicit changes, with no reverse action.
    #[must_use]
    pub fn new(id: MigrationId, name: impl Into<String>, up: Vec<SchemaChange>) -> Self {
        Self {
            id,
            name: name.into(),
            up: SchemaAction::Changes(up),
            down: None,
        }
    }

    /// Creates a step that creates one collection and deletes it on reverse.
    ///
    /// # Errors
    ///
    /// Returns a schema error if the collection definition is invalid.
    pub fn create_collection(
        id: MigrationId,
        name: impl Into<String>,
        collection: CollectionDefinition,
    ) -> Result<Self, MigrationError> {
        validate_collection(&collection)?;
        let reverse = SchemaChange::Delete(collection.id.clone());
        Ok(Self::new(id, name, vec![SchemaChange::Upsert(collection)]).with_down(vec![reverse]))
    }

    /// Creates a step that imports a JSON array of collection documents.
    ///
    /// Documents are parsed and validated here, so definition errors surface
    /// when the registry is built. The step has no reverse action.
    ///
    /// # Errors
    ///
    /// Returns a schema error if the document is malformed or a collection is invalid.
    pub fn import(
        id: MigrationId,
        name: impl Into<String>,
        json: &str,
        delete_missing: bool,
    ) -> Result<Self, MigrationError> {
        let collections = parse_collections(json)?;
        for collection in &collections {
            validate_collection(collection)?;
        }
        Ok(Self {
            id,
            name: name.into(),
            up: SchemaAction::Import {
                collections,
                delete_missing,
            },
            down: None,
        })
    }

    /// Sets the reverse action.
    #[must_use]
    pub fn with_down(mut self, changes: Vec<SchemaChange>) -> Self {
        self.down = Some(SchemaAction::Changes(changes));
        self
    }

    /// Returns the forward action.
    #[must_use]
    pub fn up_action(&self) -> &SchemaAction {
        &self.up
    }

    /// Returns true if the step has a reverse action.
    #[must_use]
    pub fn is_reversible(&self) -> bool {
        self.down.is_some()
    }
}

#[async_trait]
impl Migration for SchemaMigration {
    fn id(&self) -> MigrationId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn up(&self, schema: &mut dyn SchemaTransaction) -> Result<(), StepError> {
        self.up.run(schema).await.map(|_| ())
    }

    async fn down(&self, schema: &mut dyn SchemaTransaction) -> Result<Reversal, StepError> {
        match &self.down {
            Some(action) => action.run(schema).await.map(|_| Reversal::Reversed),
            None => Ok(Reversal::Noop),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::memory::MemorySchemaStore;
    use crate::migration::store::SchemaStore;
    use crate::schema::{FieldDefinition, SchemaError};

    fn notes() -> CollectionDefinition {
        CollectionDefinition::new("c1", "notes").with_field(FieldDefinition::primary_key("pk"))
    }

    #[test]
    fn test_import_rejects_invalid_collection_eagerly() {
        let json = r#"[{"id": "c1", "name": "notes", "fields": []}]"#;
        let result = SchemaMigration::import(MigrationId::new(1), "bad", json, false);
        assert!(matches!(
            result,
            Err(MigrationError::Schema(SchemaError::InvalidPrimaryKey { .. }))
        ));
    }

    #[test]
    fn test_import_rejects_malformed_json() {
        let result = SchemaMigration::import(MigrationId::new(1), "bad", "{", false);
        assert!(matches!(
            result,
            Err(MigrationError::Schema(SchemaError::InvalidDocument(_)))
        ));
    }

    #[test]
    fn test_create_collection_is_reversible() {
        let step = SchemaMigration::create_collection(MigrationId::new(1), "create_notes", notes())
            .unwrap();
        assert!(step.is_reversible());
        assert_eq!(step.id(), MigrationId::new(1));
        assert_eq!(step.name(), "create_notes");
    }

    #[tokio::test]
    async fn test_up_and_down_against_transaction() {
        let store = MemorySchemaStore::new();
        let step = SchemaMigration::create_collection(MigrationId::new(1), "create_notes", notes())
            .unwrap();

        let mut tx = store.begin().await.unwrap();
        step.up(tx.as_mut()).await.unwrap();
        assert_eq!(tx.collections().await.unwrap().len(), 1);
        assert_eq!(step.down(tx.as_mut()).await.unwrap(), Reversal::Reversed);
        assert!(tx.collections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_step_without_reverse_is_noop() {
        let store = MemorySchemaStore::new();
        let step = SchemaMigration::new(
            MigrationId::new(1),
            "create_notes",
            vec![SchemaChange::Upsert(notes())],
        );

        let mut tx = store.begin().await.unwrap();
        step.up(tx.as_mut()).await.unwrap();
        assert_eq!(step.down(tx.as_mut()).await.unwrap(), Reversal::Noop);
        assert_eq!(tx.collections().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_apply_changes_skips_identical_upserts() {
        let store = MemorySchemaStore::with_collections(vec![notes()]);
        let mut tx = store.begin().await.unwrap();
        let written = apply_changes(tx.as_mut(), vec![SchemaChange::Upsert(notes())])
            .await
            .unwrap();
        assert_eq!(written, 0);
    }
}
