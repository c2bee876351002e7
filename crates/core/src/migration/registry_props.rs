//! Property-based tests for registry ordering and idempotent application.

use std::collections::BTreeSet;

use proptest::prelude::*;
use stint_shared::MigrationId;

use super::error::MigrationError;
use super::memory::MemorySchemaStore;
use super::registry::MigrationRegistry;
use super::runner::Migrator;
use super::step::{Migration, SchemaMigration};
use super::store::SchemaStore;
use crate::schema::{CollectionDefinition, FieldDefinition};

fn create_step(id: u64) -> SchemaMigration {
    let collection = CollectionDefinition::new(format!("c{id}"), format!("collection_{id}"))
        .with_field(FieldDefinition::primary_key(format!("pk{id}")));
    SchemaMigration::new(
        MigrationId::new(id),
        format!("create_collection_{id}"),
        vec![crate::schema::SchemaChange::Upsert(collection)],
    )
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Iteration order is ascending regardless of registration order.
    #[test]
    fn prop_registry_iterates_ascending(ids in prop::collection::btree_set(1u64..10_000, 0..20)) {
        let mut shuffled: Vec<u64> = ids.iter().copied().collect();
        shuffled.reverse();
        let mid = shuffled.len() / 2;
        shuffled.rotate_left(mid);

        let mut registry = MigrationRegistry::new();
        for id in &shuffled {
            registry.register(create_step(*id)).unwrap();
        }

        let iterated: Vec<u64> = registry.iter().map(|step| step.id().value()).collect();
        let expected: Vec<u64> = ids.into_iter().collect();
        prop_assert_eq!(iterated, expected);
    }

    /// Any repeated identifier is rejected.
    #[test]
    fn prop_duplicate_ids_rejected(ids in prop::collection::vec(1u64..50, 2..20)) {
        let unique: BTreeSet<u64> = ids.iter().copied().collect();
        let result = MigrationRegistry::from_steps(
            ids.iter().map(|id| Box::new(create_step(*id)) as Box<dyn Migration>),
        );

        if unique.len() == ids.len() {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(matches!(result, Err(MigrationError::DuplicateMigrationId(_))));
        }
    }

    /// Applying twice leaves the ledger as after the first run.
    #[test]
    fn prop_apply_is_idempotent(ids in prop::collection::btree_set(1u64..10_000, 0..10)) {
        let registry = MigrationRegistry::from_steps(
            ids.iter().map(|id| Box::new(create_step(*id)) as Box<dyn Migration>),
        )
        .unwrap();
        let store = MemorySchemaStore::new();
        let migrator = Migrator::new(&registry);

        let (first, second, ledger) = runtime().block_on(async {
            let first = migrator.apply(&store).await.unwrap();
            let second = migrator.apply(&store).await.unwrap();
            let ledger = store.read_ledger().await.unwrap();
            (first, second, ledger)
        });

        prop_assert_eq!(first.len(), ids.len());
        prop_assert!(second.is_empty());
        prop_assert_eq!(
            ledger.ids().map(MigrationId::value).collect::<Vec<_>>(),
            ids.into_iter().collect::<Vec<_>>()
        );
    }
}
