use super::*;
use chrono::TimeZone;
use rstest::rstest;
use std::str::FromStr;

#[test]
fn test_typed_id_display() {
    let id = CollectionId::new("pbc_1092069950");
    assert_eq!(format!("{id}"), "pbc_1092069950");
    assert_eq!(id.as_str(), "pbc_1092069950");
}

#[test]
fn test_typed_id_from_str_and_string() {
    assert_eq!(FieldId::from("text3208210256"), FieldId::new("text3208210256".to_string()));
}

#[test]
fn test_typed_id_serializes_transparently() {
    let id = CollectionId::new("_pb_users_auth_");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"_pb_users_auth_\"");
    let back: CollectionId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

#[test]
fn test_migration_id_from_timestamp() {
    let at = Utc.with_ymd_and_hms(2026, 2, 1, 0, 21, 19).unwrap();
    let id = MigrationId::from_timestamp(at);
    assert_eq!(id.value(), 1_769_905_279);
    assert_eq!(id.created_at(), Some(at));
}

#[test]
fn test_migration_id_pre_epoch_clamps_to_zero() {
    let at = Utc.with_ymd_and_hms(1960, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(MigrationId::from_timestamp(at), MigrationId::new(0));
}

#[rstest]
#[case("1769902879_add_sessions_collection", Some(1_769_902_879))]
#[case("1769902879", Some(1_769_902_879))]
#[case("add_sessions_collection", None)]
#[case("", None)]
fn test_migration_id_from_file_stem(#[case] stem: &str, #[case] expected: Option<u64>) {
    assert_eq!(
        MigrationId::from_file_stem(stem).ok(),
        expected.map(MigrationId::new)
    );
}

#[test]
fn test_migration_id_from_str() {
    assert_eq!(MigrationId::from_str(" 42 ").unwrap(), MigrationId::new(42));
    assert!(MigrationId::from_str("-1").is_err());
}

#[test]
fn test_migration_id_ordering_is_numeric() {
    let mut ids = vec![
        MigrationId::new(1_769_902_879),
        MigrationId::new(99),
        MigrationId::new(1_769_900_000),
    ];
    ids.sort();
    assert_eq!(
        ids,
        vec![
            MigrationId::new(99),
            MigrationId::new(1_769_900_000),
            MigrationId::new(1_769_902_879)
        ]
    );
}

#[test]
fn test_migration_id_i64_conversions() {
    let id = MigrationId::try_from(1_769_902_879_i64).unwrap();
    assert_eq!(i64::try_from(id).unwrap(), 1_769_902_879);
    assert!(MigrationId::try_from(-5_i64).is_err());
    assert!(i64::try_from(MigrationId::new(u64::MAX)).is_err());
}
