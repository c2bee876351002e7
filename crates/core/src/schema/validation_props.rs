//! Property-based tests for collection validation and planning.

use proptest::prelude::*;

use super::collection::CollectionDefinition;
use super::error::SchemaError;
use super::field::{FieldDefinition, FieldKind, NumberOptions, TextOptions};
use super::plan::{SchemaChange, SchemaPlan};
use super::validation::validate_collection;

/// Strategy for a non-key field at a given position.
fn plain_field(index: usize) -> impl Strategy<Value = FieldDefinition> {
    prop_oneof![
        (0u32..20, 0u32..40).prop_map(move |(min, extra)| {
            FieldDefinition::new(
                format!("text{index}"),
                format!("field_{index}"),
                FieldKind::Text(TextOptions {
                    min,
                    max: min + extra,
                    ..TextOptions::default()
                }),
            )
        }),
        (0i32..100, 0i32..100).prop_map(move |(min, extra)| {
            FieldDefinition::new(
                format!("number{index}"),
                format!("field_{index}"),
                FieldKind::Number(NumberOptions {
                    min: Some(f64::from(min)),
                    max: Some(f64::from(min + extra)),
                    only_int: true,
                }),
            )
        }),
        Just(FieldDefinition::new(
            format!("bool{index}"),
            format!("field_{index}"),
            FieldKind::Bool
        )),
    ]
}

/// Strategy for a collection with `keys` primary key fields mixed in.
fn collection_with_keys(keys: usize) -> impl Strategy<Value = CollectionDefinition> {
    (0usize..6)
        .prop_flat_map(|count| (0..count).map(plain_field).collect::<Vec<_>>())
        .prop_map(move |plain| {
            let mut collection = CollectionDefinition::new("c1", "generated");
            for key in 0..keys {
                let mut field = FieldDefinition::primary_key(format!("pk{key}"));
                field.name = format!("id{key}");
                collection.fields.push(field);
            }
            collection.fields.extend(plain);
            collection
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Valid collections have exactly one primary key.
    #[test]
    fn prop_exactly_one_primary_key_accepted(collection in collection_with_keys(1)) {
        prop_assert!(validate_collection(&collection).is_ok());
        prop_assert_eq!(
            collection.fields.iter().filter(|f| f.is_primary_key()).count(),
            1
        );
    }

    /// Zero or several primary keys are rejected.
    #[test]
    fn prop_wrong_primary_key_count_rejected(
        collection in (0usize..4)
            .prop_filter("not one key", |keys| *keys != 1)
            .prop_flat_map(collection_with_keys)
    ) {
        let result = validate_collection(&collection);
        prop_assert!(
            matches!(result, Err(SchemaError::InvalidPrimaryKey { .. })),
            "expected InvalidPrimaryKey, got: {:?}",
            result
        );
    }

    /// Re-applying the changes of a plan to its own snapshot changes nothing.
    #[test]
    fn prop_replayed_plan_is_empty(collection in collection_with_keys(1)) {
        let changes = vec![SchemaChange::Upsert(collection)];
        let first = SchemaPlan::build(&[], changes.clone()).unwrap();
        let second = SchemaPlan::build(first.snapshot(), changes).unwrap();
        prop_assert!(second.is_empty());
        prop_assert_eq!(second.snapshot(), first.snapshot());
    }
}
