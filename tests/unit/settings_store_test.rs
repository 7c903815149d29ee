//! Unit tests for the SettingsStore: CRUD, duplicate handling, migration,
//! validation, lifecycle hooks, and recovery from storage failures.

#[path = "../common/mod.rs"]
mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde_json::json;

use block_history::database::Database;
use block_history::managers::storage_manager::StorageManager;
use block_history::services::settings_store::SettingsStore;
use block_history::types::errors::{CommandError, StorageError, ValidationError};
use block_history::types::rpc::InstallReason;
use block_history::types::settings::{Settings, CURRENT_SETTINGS_VERSION, MAX_KEYWORDS, SETTINGS_KEY};
use common::FlakyStorage;

fn sqlite_store() -> SettingsStore {
    let db = Arc::new(Database::open_in_memory().expect("Failed to open in-memory database"));
    SettingsStore::new(Arc::new(StorageManager::new(db)))
}

#[tokio::test]
async fn test_get_returns_defaults_when_absent() {
    let store = sqlite_store();
    let settings = store.get().await;
    assert!(!settings.is_enabled);
    assert!(settings.keywords.is_empty());
    assert_eq!(settings.version, CURRENT_SETTINGS_VERSION);
}

#[tokio::test]
async fn test_get_returns_defaults_on_read_failure() {
    let storage = FlakyStorage::new();
    storage.put_raw(SETTINGS_KEY, json!({"isEnabled": true, "keywords": ["x"], "lastUpdated": 1}));
    storage.fail_reads.store(true, Ordering::SeqCst);
    let store = SettingsStore::new(storage);

    let settings = store.get().await;
    assert!(!settings.is_enabled);
    assert!(settings.keywords.is_empty());
}

#[tokio::test]
async fn test_save_then_get_roundtrip() {
    let store = sqlite_store();
    let input = Settings {
        is_enabled: true,
        keywords: vec!["news".to_string(), "shop".to_string()],
        last_updated: 1,
        version: CURRENT_SETTINGS_VERSION.to_string(),
    };
    let saved = store.save(input.clone()).await.unwrap();
    assert!(saved.last_updated >= input.last_updated);

    let loaded = store.get().await;
    assert_eq!(loaded, saved);
    assert_eq!(
        Settings { last_updated: 0, ..loaded },
        Settings { last_updated: 0, ..input }
    );
}

#[tokio::test]
async fn test_add_keyword_appends_sanitized_in_order() {
    let store = sqlite_store();
    store.add_keyword("News").await.unwrap();
    let settings = store.add_keyword("  shop ").await.unwrap();
    assert_eq!(settings.keywords, vec!["news".to_string(), "shop".to_string()]);
    assert_eq!(store.get().await.keywords, settings.keywords);
}

#[tokio::test]
async fn test_add_keyword_rejects_case_and_space_insensitive_duplicate() {
    let store = sqlite_store();
    store.add_keyword("shop").await.unwrap();

    let err = store.add_keyword("  SHOP ").await.unwrap_err();
    assert_eq!(
        err,
        CommandError::Validation(ValidationError::Duplicate("shop".to_string()))
    );
    assert_eq!(store.get().await.keywords, vec!["shop".to_string()]);
}

#[tokio::test]
async fn test_add_keyword_duplicate_of_legacy_mixed_case_entry() {
    let storage = FlakyStorage::new();
    storage.put_raw(
        SETTINGS_KEY,
        json!({"isEnabled": false, "keywords": [" Shop"], "lastUpdated": 5, "version": "1.0.0"}),
    );
    let store = SettingsStore::new(storage);
    let err = store.add_keyword("shop").await.unwrap_err();
    assert!(matches!(err, CommandError::Validation(ValidationError::Duplicate(_))));
}

#[tokio::test]
async fn test_add_keyword_validation_errors() {
    let store = sqlite_store();
    assert_eq!(
        store.add_keyword("   ").await.unwrap_err(),
        CommandError::Validation(ValidationError::Empty)
    );
    assert!(matches!(
        store.add_keyword("<script>").await.unwrap_err(),
        CommandError::Validation(ValidationError::ForbiddenCharacters(_))
    ));
    assert!(matches!(
        store.add_keyword(&"k".repeat(101)).await.unwrap_err(),
        CommandError::Validation(ValidationError::TooLong(101))
    ));
}

#[tokio::test]
async fn test_add_keyword_limit() {
    let storage = FlakyStorage::new();
    let keywords: Vec<String> = (0..MAX_KEYWORDS).map(|i| format!("k{}", i)).collect();
    storage.put_raw(
        SETTINGS_KEY,
        json!({"isEnabled": false, "keywords": keywords, "lastUpdated": 5, "version": "1.0.0"}),
    );
    let store = SettingsStore::new(storage);
    assert_eq!(
        store.add_keyword("one-more").await.unwrap_err(),
        CommandError::Validation(ValidationError::LimitReached(MAX_KEYWORDS))
    );
}

#[tokio::test]
async fn test_add_keyword_reports_storage_failure() {
    let storage = FlakyStorage::new();
    storage.fail_writes.store(true, Ordering::SeqCst);
    let store = SettingsStore::new(storage);
    let err = store.add_keyword("shop").await.unwrap_err();
    assert!(matches!(err, CommandError::Storage(StorageError::QuotaExceeded { .. })));
}

#[tokio::test]
async fn test_remove_keyword_is_case_sensitive_and_removes_all_copies() {
    let storage = FlakyStorage::new();
    storage.put_raw(
        SETTINGS_KEY,
        json!({"isEnabled": false, "keywords": ["shop", "Shop", "shop", "news"], "lastUpdated": 5, "version": "1.0.0"}),
    );
    let store = SettingsStore::new(storage);
    let settings = store.remove_keyword("shop").await.unwrap();
    assert_eq!(settings.keywords, vec!["Shop".to_string(), "news".to_string()]);
}

#[tokio::test]
async fn test_remove_absent_keyword_is_noop() {
    let storage = FlakyStorage::new();
    storage.put_raw(
        SETTINGS_KEY,
        json!({"isEnabled": true, "keywords": ["news"], "lastUpdated": 5, "version": "1.0.0"}),
    );
    let store = SettingsStore::new(storage.clone());
    let settings = store.remove_keyword("shop").await.unwrap();
    assert_eq!(settings.keywords, vec!["news".to_string()]);
    assert_eq!(settings.last_updated, 5);
    assert_eq!(storage.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_clear_keywords_and_set_enabled_are_independent() {
    let store = sqlite_store();
    store.add_keyword("shop").await.unwrap();
    let enabled = store.set_enabled(true).await.unwrap();
    assert!(enabled.is_enabled);
    assert_eq!(enabled.keywords, vec!["shop".to_string()]);

    let cleared = store.clear_keywords().await.unwrap();
    assert!(cleared.keywords.is_empty());
    assert!(cleared.is_enabled);
}

#[tokio::test]
async fn test_migrate_missing_version_preserves_user_data() {
    let storage = FlakyStorage::new();
    let raw = json!({"isEnabled": true, "keywords": ["news", "shop"], "lastUpdated": 1234});
    storage.put_raw(SETTINGS_KEY, raw.clone());
    let store = SettingsStore::new(storage.clone());

    let migrated = store.migrate(&raw).await;
    assert!(migrated.is_enabled);
    assert_eq!(migrated.keywords, vec!["news".to_string(), "shop".to_string()]);
    assert_eq!(migrated.last_updated, 1234);
    assert_eq!(migrated.version, CURRENT_SETTINGS_VERSION);

    let stored = storage.raw(SETTINGS_KEY).unwrap();
    assert!(SettingsStore::validate(&stored));
    assert_eq!(stored["version"], CURRENT_SETTINGS_VERSION);
}

#[tokio::test]
async fn test_migrate_fills_missing_fields_with_defaults() {
    let storage = FlakyStorage::new();
    let store = SettingsStore::new(storage.clone());
    let migrated = store.migrate(&json!({"keywords": ["shop"]})).await;
    assert!(!migrated.is_enabled);
    assert_eq!(migrated.keywords, vec!["shop".to_string()]);
    assert!(migrated.last_updated > 0);
    assert!(SettingsStore::validate(&storage.raw(SETTINGS_KEY).unwrap()));
}

#[tokio::test]
async fn test_migrate_current_version_does_not_write() {
    let storage = FlakyStorage::new();
    let store = SettingsStore::new(storage.clone());
    let raw = json!({"isEnabled": false, "keywords": [], "lastUpdated": 9, "version": CURRENT_SETTINGS_VERSION});
    let migrated = store.migrate(&raw).await;
    assert_eq!(migrated.last_updated, 9);
    assert_eq!(storage.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_migrate_survives_write_failure() {
    let storage = FlakyStorage::new();
    storage.fail_writes.store(true, Ordering::SeqCst);
    let store = SettingsStore::new(storage);
    let migrated = store.migrate(&json!({"isEnabled": true, "keywords": ["a"], "lastUpdated": 1})).await;
    assert!(migrated.is_enabled);
    assert_eq!(migrated.keywords, vec!["a".to_string()]);
}

#[tokio::test]
async fn test_on_installed_fresh_writes_defaults() {
    let storage = FlakyStorage::new();
    let store = SettingsStore::new(storage.clone());
    let settings = store.on_installed(InstallReason::Install).await;
    assert!(!settings.is_enabled);
    assert!(storage.raw(SETTINGS_KEY).is_some());
}

#[tokio::test]
async fn test_on_installed_preserves_existing_data() {
    let storage = FlakyStorage::new();
    let raw = json!({"isEnabled": true, "keywords": ["shop"], "lastUpdated": 7, "version": "1.0.0"});
    storage.put_raw(SETTINGS_KEY, raw.clone());
    let store = SettingsStore::new(storage.clone());

    let settings = store.on_installed(InstallReason::Install).await;
    assert!(settings.is_enabled);
    assert_eq!(settings.keywords, vec!["shop".to_string()]);
    assert_eq!(storage.raw(SETTINGS_KEY).unwrap(), raw);
}

#[tokio::test]
async fn test_on_installed_update_adds_missing_fields() {
    let storage = FlakyStorage::new();
    storage.put_raw(SETTINGS_KEY, json!({"isEnabled": true, "keywords": ["shop"]}));
    let store = SettingsStore::new(storage.clone());

    let settings = store.on_installed(InstallReason::Update).await;
    assert!(settings.is_enabled);
    assert_eq!(settings.keywords, vec!["shop".to_string()]);
    assert_eq!(settings.version, CURRENT_SETTINGS_VERSION);
    assert!(SettingsStore::validate(&storage.raw(SETTINGS_KEY).unwrap()));
}

#[tokio::test]
async fn test_on_startup_repairs_invalid_settings() {
    let storage = FlakyStorage::new();
    storage.put_raw(SETTINGS_KEY, json!({"isEnabled": "nope", "keywords": ["keep"]}));
    let store = SettingsStore::new(storage.clone());

    let settings = store.on_startup().await;
    assert!(!settings.is_enabled);
    assert_eq!(settings.keywords, vec!["keep".to_string()]);
    let stored = storage.raw(SETTINGS_KEY).unwrap();
    assert!(SettingsStore::validate(&stored));
    assert_eq!(stored["version"], CURRENT_SETTINGS_VERSION);
}

#[tokio::test]
async fn test_on_startup_initializes_when_empty() {
    let storage = FlakyStorage::new();
    let store = SettingsStore::new(storage.clone());
    store.on_startup().await;
    assert!(SettingsStore::validate(&storage.raw(SETTINGS_KEY).unwrap()));
}

#[tokio::test]
async fn test_export_then_import_restores_keywords() {
    let source = sqlite_store();
    source.add_keyword("shop").await.unwrap();
    source.set_enabled(true).await.unwrap();
    let exported = source.export_settings().await.unwrap();

    let target = sqlite_store();
    let imported = target.import_settings(&exported).await.unwrap();
    assert!(imported.is_enabled);
    assert_eq!(imported.keywords, vec!["shop".to_string()]);
    assert_eq!(target.get().await, imported);
}

#[tokio::test]
async fn test_import_rejects_malformed_documents() {
    let store = sqlite_store();
    assert!(matches!(
        store.import_settings("not json").await.unwrap_err(),
        CommandError::Validation(ValidationError::InvalidImport(_))
    ));
    assert!(matches!(
        store.import_settings(r#"{"version":"1.0.0"}"#).await.unwrap_err(),
        CommandError::Validation(ValidationError::InvalidImport(_))
    ));
}

#[tokio::test]
async fn test_reset_to_defaults() {
    let store = sqlite_store();
    store.add_keyword("shop").await.unwrap();
    store.set_enabled(true).await.unwrap();
    let reset = store.reset_to_defaults().await.unwrap();
    assert!(!reset.is_enabled);
    assert!(reset.keywords.is_empty());
    assert_eq!(store.get().await, reset);
}

#[tokio::test]
async fn test_storage_info_reports_usage() {
    let store = sqlite_store();
    store.add_keyword("shop").await.unwrap();
    let info = store.storage_info().await.unwrap();
    assert!(info.used > 0);
    assert_eq!(info.quota, 102_400);
    assert!(info.percentage > 0.0 && info.percentage < 100.0);
}
