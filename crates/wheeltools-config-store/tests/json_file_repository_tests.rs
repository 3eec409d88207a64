//! Integration tests for `JsonFileConfigRepository`.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use uuid::Uuid;
use wheeltools_config_store::json_file_repository::JsonFileConfigRepository;
use wheeltools_core::error::DomainError;
use wheeltools_core::repository::ConfigRepository;
use wheeltools_roster::application::roster_store::{DefaultsUpdate, RosterStore};
use wheeltools_test_support::FixedClock;

/// Unique scratch directory removed when dropped.
struct ScratchDir(PathBuf);

impl ScratchDir {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("wheeltools-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }

    fn file(&self, name: &str) -> PathBuf {
        self.0.join(name)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

// --- load ---

#[test]
fn test_load_missing_file_returns_none() {
    let dir = ScratchDir::new();
    let repo = JsonFileConfigRepository::new(dir.file("config.json"));

    let loaded = repo.load().unwrap();

    assert!(loaded.is_none());
}

#[test]
fn test_load_garbage_is_an_infrastructure_error() {
    let dir = ScratchDir::new();
    let path = dir.file("config.json");
    fs::write(&path, "{not json").unwrap();
    let repo = JsonFileConfigRepository::new(path);

    let result = repo.load();

    assert!(matches!(result, Err(DomainError::Infrastructure(_))));
}

// --- save ---

#[test]
fn test_save_then_load_returns_same_document() {
    let dir = ScratchDir::new();
    let repo = JsonFileConfigRepository::new(dir.file("config.json"));
    let document = serde_json::json!({ "version": 1, "members": [] });

    repo.save(&document).unwrap();
    let loaded = repo.load().unwrap();

    assert_eq!(loaded, Some(document));
}

#[test]
fn test_save_creates_missing_directories_and_leaves_no_temp_file() {
    let dir = ScratchDir::new();
    let path = dir.file("nested/deeper/config.json");
    let repo = JsonFileConfigRepository::new(&path);

    repo.save(&serde_json::json!({ "version": 1 })).unwrap();
    repo.save(&serde_json::json!({ "version": 2 })).unwrap();

    assert!(path.exists());
    assert!(!dir.file("nested/deeper/config.json.tmp").exists());
    assert_eq!(repo.load().unwrap().unwrap()["version"], 2);
}

// --- with the roster store ---

fn open_store(repo: &JsonFileConfigRepository) -> RosterStore {
    let clock = Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
    ));
    RosterStore::open(Arc::new(repo.clone()), clock).unwrap()
}

#[test]
fn test_restart_keeps_settings_and_clears_members() {
    // Arrange
    let dir = ScratchDir::new();
    let repo = JsonFileConfigRepository::new(dir.file("config.json"));
    let store = open_store(&repo);
    store
        .update_defaults(DefaultsUpdate {
            preset: Some("classic".to_owned()),
            spin_amount: Some("2".to_owned()),
            ..DefaultsUpdate::default()
        })
        .unwrap();
    store.upsert_from_membership("Alys Tern").unwrap();
    drop(store);

    // Act
    let reopened = open_store(&repo);

    // Assert
    let config = reopened.snapshot();
    assert_eq!(config.defaults.preset, "classic");
    assert_eq!(config.defaults.spin_amount.raw(), "2");
    assert!(config.members().is_empty());
    let on_disk = repo.load().unwrap().unwrap();
    assert_eq!(on_disk["members"], serde_json::json!([]));
}
