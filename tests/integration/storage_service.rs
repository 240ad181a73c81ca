//! Integration tests for the storage service over both shipped backends.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use agentic_wallet::record::TagMap;
use agentic_wallet::{
    FileBackend, MemoryBackend, Record, RecordProps, RecordRegistry, StorageBackend,
    StorageService, WalletError,
};

const TEST_RECORD: &str = "TestRecord";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TestRecord {
    id: String,
    foo: String,
    #[serde(default)]
    tags: TagMap,
}

impl TestRecord {
    fn new(id: &str, foo: &str, tags: &[(&str, &str)]) -> Self {
        Self {
            id: id.to_string(),
            foo: foo.to_string(),
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl Record for TestRecord {
    fn record_type(&self) -> &str {
        TEST_RECORD
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn tags(&self) -> TagMap {
        self.tags.clone()
    }

    fn to_props(&self) -> agentic_wallet::Result<RecordProps> {
        RecordProps::from_serializable(TEST_RECORD, self)
    }
}

fn registry() -> RecordRegistry<TestRecord> {
    RecordRegistry::new().register(TEST_RECORD, |props| props.into_typed())
}

fn memory_service() -> StorageService<TestRecord> {
    StorageService::new(Arc::new(MemoryBackend::new()), registry())
}

async fn file_service(dir: &std::path::Path) -> StorageService<TestRecord> {
    let backend: Arc<dyn StorageBackend> = Arc::new(FileBackend::open(dir).await.unwrap());
    StorageService::new(backend, registry())
}

// ── Shared scenarios ──────────────────────────────────────────────────────────

async fn scenario_save_and_find(service: &StorageService<TestRecord>) {
    let record = TestRecord::new("test-id", "bar", &[("myTag", "foobar")]);
    service.save(&record).await.unwrap();

    let loaded = service.get_by_id(TEST_RECORD, "test-id").await.unwrap();
    assert_eq!(loaded, record);

    let query: TagMap = [("myTag".to_string(), "foobar".to_string())].into();
    let found = service.find_by_query(TEST_RECORD, &query).await.unwrap();
    assert_eq!(found, vec![record]);
}

async fn scenario_duplicate(service: &StorageService<TestRecord>) {
    let record = TestRecord::new("dup", "x", &[]);
    service.save(&record).await.unwrap();

    let err = service.save(&record).await.unwrap_err();
    match err {
        WalletError::RecordDuplicate { record_type, id } => {
            assert_eq!(record_type, TEST_RECORD);
            assert_eq!(id, "dup");
        }
        other => panic!("expected RecordDuplicate, got {other:?}"),
    }
}

async fn scenario_absent(service: &StorageService<TestRecord>) {
    let ghost = TestRecord::new("ghost", "x", &[]);

    let err = service.update(&ghost).await.unwrap_err();
    assert!(matches!(err, WalletError::RecordNotFound { .. }), "{err:?}");

    let err = service.delete(&ghost).await.unwrap_err();
    assert!(matches!(err, WalletError::RecordNotFound { .. }), "{err:?}");

    let err = service.get_by_id(TEST_RECORD, "ghost").await.unwrap_err();
    assert!(matches!(err, WalletError::RecordNotFound { .. }), "{err:?}");
}

async fn scenario_update_then_delete(service: &StorageService<TestRecord>) {
    let mut record = TestRecord::new("u1", "before", &[("state", "draft")]);
    service.save(&record).await.unwrap();

    record.foo = "after".into();
    record.tags = [("state".to_string(), "final".to_string())].into();
    service.update(&record).await.unwrap();

    let loaded = service.get_by_id(TEST_RECORD, "u1").await.unwrap();
    assert_eq!(loaded.foo, "after");
    assert_eq!(loaded.tags["state"], "final");

    let old: TagMap = [("state".to_string(), "draft".to_string())].into();
    assert!(service.find_by_query(TEST_RECORD, &old).await.unwrap().is_empty());

    service.delete(&record).await.unwrap();
    let err = service.get_by_id(TEST_RECORD, "u1").await.unwrap_err();
    assert!(matches!(err, WalletError::RecordNotFound { .. }));
}

async fn scenario_get_all_and_query(service: &StorageService<TestRecord>) {
    let records = vec![
        TestRecord::new("a", "1", &[("color", "red"), ("size", "s")]),
        TestRecord::new("b", "2", &[("color", "red"), ("size", "m")]),
        TestRecord::new("c", "3", &[("color", "blue"), ("size", "s")]),
        TestRecord::new("d", "4", &[]),
    ];
    for r in &records {
        service.save(r).await.unwrap();
    }

    let all = service.get_all(TEST_RECORD).await.unwrap();
    let ids: HashSet<String> = all.into_iter().map(|r| r.id).collect();
    assert_eq!(ids, ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect());

    let red: TagMap = [("color".to_string(), "red".to_string())].into();
    let mut found: Vec<String> = service
        .find_by_query(TEST_RECORD, &red)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    found.sort();
    assert_eq!(found, vec!["a", "b"]);

    let red_small: TagMap = [
        ("color".to_string(), "red".to_string()),
        ("size".to_string(), "s".to_string()),
    ]
    .into();
    let found = service.find_by_query(TEST_RECORD, &red_small).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "a");

    let missing_key: TagMap = [("shape".to_string(), "round".to_string())].into();
    assert!(service
        .find_by_query(TEST_RECORD, &missing_key)
        .await
        .unwrap()
        .is_empty());

    // Other type tags are a separate namespace.
    assert!(service.get_all("OtherRecord").await.unwrap().is_empty());
}

// ── Memory backend ────────────────────────────────────────────────────────────

#[tokio::test]
async fn memory_save_and_find() {
    scenario_save_and_find(&memory_service()).await;
}

#[tokio::test]
async fn memory_duplicate() {
    scenario_duplicate(&memory_service()).await;
}

#[tokio::test]
async fn memory_absent() {
    scenario_absent(&memory_service()).await;
}

#[tokio::test]
async fn memory_update_then_delete() {
    scenario_update_then_delete(&memory_service()).await;
}

#[tokio::test]
async fn memory_get_all_and_query() {
    scenario_get_all_and_query(&memory_service()).await;
}

// ── File backend ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn file_save_and_find() {
    let dir = tempfile::tempdir().unwrap();
    scenario_save_and_find(&file_service(dir.path()).await).await;
}

#[tokio::test]
async fn file_duplicate() {
    let dir = tempfile::tempdir().unwrap();
    scenario_duplicate(&file_service(dir.path()).await).await;
}

#[tokio::test]
async fn file_absent() {
    let dir = tempfile::tempdir().unwrap();
    scenario_absent(&file_service(dir.path()).await).await;
}

#[tokio::test]
async fn file_update_then_delete() {
    let dir = tempfile::tempdir().unwrap();
    scenario_update_then_delete(&file_service(dir.path()).await).await;
}

#[tokio::test]
async fn file_get_all_and_query() {
    let dir = tempfile::tempdir().unwrap();
    scenario_get_all_and_query(&file_service(dir.path()).await).await;
}

#[tokio::test]
async fn file_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let record = TestRecord::new("persist", "v", &[("k", "v")]);

    file_service(dir.path()).await.save(&record).await.unwrap();

    let reopened = file_service(dir.path()).await;
    assert_eq!(reopened.get_by_id(TEST_RECORD, "persist").await.unwrap(), record);
}

#[tokio::test]
async fn unregistered_type_is_decode_error() {
    let backend = Arc::new(MemoryBackend::new());
    let service = StorageService::new(backend.clone(), registry());
    service
        .save(&TestRecord::new("x", "y", &[]))
        .await
        .unwrap();

    let empty: StorageService<TestRecord> = StorageService::new(backend, RecordRegistry::new());
    let err = empty.get_by_id(TEST_RECORD, "x").await.unwrap_err();
    assert!(matches!(err, WalletError::Decode { .. }), "{err:?}");
}
