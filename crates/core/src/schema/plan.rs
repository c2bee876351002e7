//! Snapshot planning: folds schema changes over the current schema and
//! validates the result as a whole.

use std::collections::{HashMap, HashSet};

use stint_shared::CollectionId;

use super::collection::CollectionDefinition;
use super::error::SchemaError;
use super::validation::validate_collection;

/// A single change to the schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaChange {
    /// Create the collection, or replace the one with the same ID.
    Upsert(CollectionDefinition),
    /// Delete the collection with this ID.
    Delete(CollectionId),
}

impl SchemaChange {
    /// Returns the ID of the collection this change targets.
    #[must_use]
    pub fn collection_id(&self) -> &CollectionId {
        match self {
            Self::Upsert(collection) => &collection.id,
            Self::Delete(id) => id,
        }
    }
}

/// A validated set of changes together with the schema they produce.
#[derive(Debug, Clone)]
pub struct SchemaPlan {
    changes: Vec<SchemaChange>,
    snapshot: Vec<CollectionDefinition>,
}

impl SchemaPlan {
    /// Applies `changes` in order to `existing` and validates the outcome.
    ///
    /// Upserts identical to the current definition are dropped, so replaying
    /// a plan is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the first definition error, or a snapshot error if names
    /// collide, a relation is unresolved, a primary key was altered, or a
    /// delete targets an unknown or system collection.
    pub fn build(
        existing: &[CollectionDefinition],
        changes: impl IntoIterator<Item = SchemaChange>,
    ) -> Result<Self, SchemaError> {
        let mut snapshot = existing.to_vec();
        let mut effective = Vec::new();

        for change in changes {
            let position = snapshot
                .iter()
                .position(|collection| &collection.id == change.collection_id());

            match (&change, position) {
                (SchemaChange::Upsert(collection), Some(index)) => {
                    validate_collection(collection)?;
                    if snapshot[index] == *collection {
                        continue;
                    }
                    check_primary_key_unchanged(&snapshot[index], collection)?;
                    snapshot[index] = collection.clone();
                }
                (SchemaChange::Upsert(collection), None) => {
                    validate_collection(collection)?;
                    snapshot.push(collection.clone());
                }
                (SchemaChange::Delete(_), Some(index)) => {
                    if snapshot[index].system {
                        return Err(SchemaError::ProtectedCollection(
                            snapshot[index].name.clone(),
                        ));
                    }
                    snapshot.remove(index);
                }
                (SchemaChange::Delete(id), None) => {
                    return Err(SchemaError::UnknownCollection(id.clone()));
                }
            }
            effective.push(change);
        }

        check_snapshot(&snapshot)?;

        Ok(Self {
            changes: effective,
            snapshot,
        })
    }

    /// Returns the effective changes, in application order.
    #[must_use]
    pub fn changes(&self) -> &[SchemaChange] {
        &self.changes
    }

    /// Consumes the plan and returns the effective changes.
    #[must_use]
    pub fn into_changes(self) -> Vec<SchemaChange> {
        self.changes
    }

    /// Returns the resulting schema.
    #[must_use]
    pub fn snapshot(&self) -> &[CollectionDefinition] {
        &self.snapshot
    }

    /// Returns true if the plan changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Parses a JSON array of collection documents.
///
/// # Errors
///
/// Returns `InvalidDocument` if the JSON does not match the interchange shape.
pub fn parse_collections(json: &str) -> Result<Vec<CollectionDefinition>, SchemaError> {
    Ok(serde_json::from_str(json)?)
}

/// Builds the changes that import `incoming` over `existing`.
///
/// Every incoming collection is upserted. With `delete_missing`, existing
/// non-system collections absent from `incoming` are deleted first, so their
/// names can be reused by the import.
#[must_use]
pub fn import_changes(
    existing: &[CollectionDefinition],
    incoming: Vec<CollectionDefinition>,
    delete_missing: bool,
) -> Vec<SchemaChange> {
    let mut changes = Vec::with_capacity(incoming.len());

    if delete_missing {
        let keep: HashSet<&CollectionId> = incoming.iter().map(|c| &c.id).collect();
        changes.extend(
            existing
                .iter()
                .filter(|collection| !collection.system && !keep.contains(&collection.id))
                .map(|collection| SchemaChange::Delete(collection.id.clone())),
        );
    }

    changes.extend(incoming.into_iter().map(SchemaChange::Upsert));
    changes
}

fn check_primary_key_unchanged(
    current: &CollectionDefinition,
    next: &CollectionDefinition,
) -> Result<(), SchemaError> {
    let Some(current_key) = current.primary_key() else {
        return Ok(());
    };

    let unchanged = next.primary_key().is_some_and(|next_key| {
        next_key.id == current_key.id
            && next_key.name == current_key.name
            && next_key.kind == current_key.kind
    });

    if unchanged {
        Ok(())
    } else {
        Err(SchemaError::ImmutableField {
            collection: next.name.clone(),
            field: current_key.name.clone(),
        })
    }
}

fn check_snapshot(snapshot: &[CollectionDefinition]) -> Result<(), SchemaError> {
    let mut names: HashMap<String, &CollectionId> = HashMap::with_capacity(snapshot.len());
    for collection in snapshot {
        if names
            .insert(collection.name.to_ascii_lowercase(), &collection.id)
            .is_some()
        {
            return Err(SchemaError::DuplicateCollection(collection.name.clone()));
        }
    }

    let ids: HashSet<&CollectionId> = snapshot.iter().map(|c| &c.id).collect();
    for collection in snapshot {
        for (field, relation) in collection.relations() {
            if !ids.contains(&relation.collection_id) {
                return Err(SchemaError::UnresolvedReference {
                    collection: collection.name.clone(),
                    field: field.name.clone(),
                    target: relation.collection_id.clone(),
                });
            }
        }
    }

    Ok(())
}
