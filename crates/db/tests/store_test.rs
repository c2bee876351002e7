//! Integration tests for the SQL schema store against `SQLite`.

use async_trait::async_trait;
use stint_core::migration::{
    MemorySchemaStore, Migration, MigrationError, MigrationRegistry, Migrator, Reversal,
    SchemaMigration, SchemaStore, SchemaTransaction, StepError, StoreError, apply_changes,
};
use stint_core::schema::{
    CollectionDefinition, FieldDefinition, FieldKind, SchemaChange, TextOptions,
};
use stint_db::{DbSchemaStore, collections};
use stint_shared::MigrationId;
use stint_shared::config::DatabaseConfig;
use tempfile::TempDir;

/// A database file inside a temporary directory removed when the test ends.
struct TestDb {
    dir: TempDir,
}

impl TestDb {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    fn config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", self.dir.path().join("stint.db").display()),
            max_connections: 1,
            min_connections: 1,
        }
    }

    async fn store(&self) -> DbSchemaStore {
        DbSchemaStore::connect(&self.config())
            .await
            .expect("Failed to connect to test database")
    }
}

fn notes() -> CollectionDefinition {
    CollectionDefinition::new("c_notes", "notes").with_field(FieldDefinition::primary_key("pk"))
}

fn tags() -> CollectionDefinition {
    CollectionDefinition::new("c_tags", "tags").with_field(FieldDefinition::primary_key("pk"))
}

fn create(id: u64, collection: CollectionDefinition) -> Box<dyn Migration> {
    let name = format!("create_{}", collection.name);
    Box::new(SchemaMigration::create_collection(MigrationId::new(id), name, collection).unwrap())
}

/// Writes a collection, then fails.
struct FailingStep;

#[async_trait]
impl Migration for FailingStep {
    fn id(&self) -> MigrationId {
        MigrationId::new(2)
    }

    fn name(&self) -> &str {
        "half_done"
    }

    async fn up(&self, schema: &mut dyn SchemaTransaction) -> Result<(), StepError> {
        apply_changes(schema, vec![SchemaChange::Upsert(tags())]).await?;
        Err(StoreError::Backend("connection reset".to_string()).into())
    }

    async fn down(&self, _schema: &mut dyn SchemaTransaction) -> Result<Reversal, StepError> {
        Ok(Reversal::Noop)
    }
}

#[tokio::test]
async fn test_apply_creates_sessions_collection() {
    let db = TestDb::new();
    let store = db.store().await;
    let registry = collections::registry().unwrap();

    let applied = Migrator::new(&registry).apply(&store).await.unwrap();
    assert_eq!(
        applied.ids(),
        &[
            collections::m1769902000_init_users_collection::ID,
            collections::m1769902879_add_sessions_collection::ID,
        ]
    );

    let names: Vec<String> = store
        .collections()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["users", "sessions"]);

    let sessions = store
        .collections()
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.name == "sessions")
        .unwrap();
    assert_eq!(
        sessions.field_names(),
        vec![
            "id", "name", "duration", "energy", "note", "created_by", "date", "created_at",
            "updated_at",
        ]
    );

    let ledger = store.read_ledger().await.unwrap();
    assert_eq!(ledger.len(), 2);
    assert_eq!(
        ledger
            .get(collections::m1769902879_add_sessions_collection::ID)
            .map(|entry| entry.name.as_str()),
        Some("add_sessions_collection")
    );
}

#[tokio::test]
async fn test_second_apply_is_noop() {
    let db = TestDb::new();
    let store = db.store().await;
    let registry = collections::registry().unwrap();
    let migrator = Migrator::new(&registry);

    migrator.apply(&store).await.unwrap();
    let ledger = store.read_ledger().await.unwrap();

    let applied = migrator.apply(&store).await.unwrap();
    assert!(applied.is_empty());
    assert_eq!(store.read_ledger().await.unwrap(), ledger);
}

#[tokio::test]
async fn test_schema_and_ledger_persist_across_reconnect() {
    let db = TestDb::new();
    let registry = collections::registry().unwrap();

    let before = {
        let store = db.store().await;
        Migrator::new(&registry).apply(&store).await.unwrap();
        store.collections().await.unwrap()
    };

    let store = db.store().await;
    assert_eq!(store.collections().await.unwrap(), before);
    assert!(Migrator::new(&registry).pending(&store).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_lock_excludes_other_connections() {
    let db = TestDb::new();
    let holder = db.store().await;
    let other = db.store().await;
    let registry = collections::registry().unwrap();

    assert!(holder.try_lock("deploy-1").await.unwrap());
    assert_eq!(holder.lock_holder().await.unwrap().as_deref(), Some("deploy-1"));

    let result = Migrator::new(&registry).apply(&other).await;
    assert!(matches!(result, Err(MigrationError::LockContention)));
    assert!(other.collections().await.unwrap().is_empty());
    assert!(other.read_ledger().await.unwrap().is_empty());

    holder.unlock("deploy-1").await.unwrap();
    Migrator::new(&registry).apply(&other).await.unwrap();
    assert!(other.lock_holder().await.unwrap().is_none());
}

#[tokio::test]
async fn test_unlock_leaves_lock_of_other_holder() {
    let db = TestDb::new();
    let store = db.store().await;

    assert!(store.try_lock("deploy-1").await.unwrap());
    assert_eq!(store.force_unlock().await.unwrap().as_deref(), Some("deploy-1"));
    assert!(store.try_lock("deploy-2").await.unwrap());

    store.unlock("deploy-1").await.unwrap();
    assert_eq!(store.lock_holder().await.unwrap().as_deref(), Some("deploy-2"));

    store.unlock("deploy-2").await.unwrap();
    assert!(store.lock_holder().await.unwrap().is_none());
    assert!(store.force_unlock().await.unwrap().is_none());
}

#[tokio::test]
async fn test_step_may_swap_collection_names() {
    let db = TestDb::new();
    let sql = db.store().await;
    let memory = MemorySchemaStore::new();

    let mut old_notes = notes();
    old_notes.name = "old_notes".to_string();
    let new_notes = CollectionDefinition::new("c_notes_v2", "notes")
        .with_field(FieldDefinition::primary_key("pk"));
    let registry = MigrationRegistry::from_steps(vec![
        create(1, notes()),
        Box::new(SchemaMigration::new(
            MigrationId::new(2),
            "swap_notes_name",
            vec![SchemaChange::Upsert(new_notes), SchemaChange::Upsert(old_notes)],
        )),
    ])
    .unwrap();
    let migrator = Migrator::new(&registry);

    migrator.apply(&memory).await.unwrap();
    migrator.apply(&sql).await.unwrap();

    let names = |collections: Vec<CollectionDefinition>| -> Vec<String> {
        collections.into_iter().map(|c| c.name).collect()
    };
    assert_eq!(names(sql.collections().await.unwrap()), vec!["old_notes", "notes"]);
    assert_eq!(
        sql.collections().await.unwrap(),
        memory.collections().await.unwrap()
    );
    assert_eq!(sql.read_ledger().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_failed_step_rolls_back_its_writes() {
    let db = TestDb::new();
    let store = db.store().await;
    let registry =
        MigrationRegistry::from_steps(vec![create(1, notes()), Box::new(FailingStep)]).unwrap();

    let result = Migrator::new(&registry).apply(&store).await;
    assert!(matches!(
        result,
        Err(MigrationError::MigrationFailed { step_id, .. }) if step_id == MigrationId::new(2)
    ));

    let ledger = store.read_ledger().await.unwrap();
    assert!(ledger.contains(MigrationId::new(1)));
    assert!(!ledger.contains(MigrationId::new(2)));
    assert_eq!(store.collections().await.unwrap(), vec![notes()]);
    assert!(store.lock_holder().await.unwrap().is_none());
}

#[tokio::test]
async fn test_rollback_of_sessions_keeps_collection() {
    let db = TestDb::new();
    let store = db.store().await;
    let registry = collections::registry().unwrap();
    let migrator = Migrator::new(&registry);
    migrator.apply(&store).await.unwrap();

    let report = migrator.rollback_last(&store, 1).await.unwrap();
    assert_eq!(report.reverted, vec![collections::m1769902879_add_sessions_collection::ID]);
    assert_eq!(report.irreversible, report.reverted);

    assert_eq!(store.collections().await.unwrap().len(), 2);
    assert_eq!(
        migrator.pending(&store).await.unwrap(),
        vec![collections::m1769902879_add_sessions_collection::ID]
    );

    let applied = migrator.apply(&store).await.unwrap();
    assert_eq!(applied.len(), 1);
}

#[tokio::test]
async fn test_rollback_restores_schema() {
    let db = TestDb::new();
    let store = db.store().await;
    let registry =
        MigrationRegistry::from_steps(vec![create(1, notes()), create(2, tags())]).unwrap();
    let migrator = Migrator::new(&registry);

    migrator.apply(&store).await.unwrap();
    let report = migrator.rollback(&store, Some(MigrationId::new(1))).await.unwrap();

    assert_eq!(report.reverted, vec![MigrationId::new(2)]);
    assert!(report.irreversible.is_empty());
    assert_eq!(store.collections().await.unwrap(), vec![notes()]);
    assert_eq!(
        store.read_ledger().await.unwrap().ids().collect::<Vec<_>>(),
        vec![MigrationId::new(1)]
    );
}

#[tokio::test]
async fn test_update_keeps_collection_order() {
    let db = TestDb::new();
    let store = db.store().await;

    let notes_v2 = notes().with_field(FieldDefinition::new(
        "text_title",
        "title",
        FieldKind::Text(TextOptions::default()),
    ));
    let registry = MigrationRegistry::from_steps(vec![
        create(1, notes()),
        create(2, tags()),
        Box::new(SchemaMigration::new(
            MigrationId::new(3),
            "add_notes_title",
            vec![SchemaChange::Upsert(notes_v2.clone())],
        )),
    ])
    .unwrap();

    Migrator::new(&registry).apply(&store).await.unwrap();
    assert_eq!(store.collections().await.unwrap(), vec![notes_v2, tags()]);
}

#[tokio::test]
async fn test_dropped_transaction_is_rolled_back() {
    let db = TestDb::new();
    let store = db.store().await;

    {
        let mut tx = store.begin().await.unwrap();
        tx.apply_schema_change(&SchemaChange::Upsert(notes())).await.unwrap();
        tx.append_ledger(MigrationId::new(1), "create_notes").await.unwrap();
    }

    assert!(store.collections().await.unwrap().is_empty());
    assert!(store.read_ledger().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_connect_to_in_memory_database() {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    };
    let store = DbSchemaStore::connect(&config).await.unwrap();

    let mut tx = store.begin().await.unwrap();
    tx.append_ledger(MigrationId::new(7), "first").await.unwrap();
    tx.append_ledger(MigrationId::new(7), "second").await.unwrap();
    tx.commit().await.unwrap();

    let ledger = store.read_ledger().await.unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.get(MigrationId::new(7)).map(|e| e.name.as_str()), Some("first"));
}
