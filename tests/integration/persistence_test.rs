//! Persistence tests for history, settings and audit on disk.
//!
//! Each test opens a `FileStore` in a temporary directory, writes through
//! one set of managers, then reloads with fresh managers as a restarted
//! application would.

use super::init_test_env;
use medlit::audit::{self, AuditEventType, AuditLog};
use medlit::history::{SearchHistory, MAX_HISTORY_ENTRIES};
use medlit::settings::{ModelChoice, Schedule, SettingsManager, SummaryLength, MAX_TRACKED_KEYWORDS};
use medlit::storage::{FileStore, KeyValueStore, AUDIT_KEY, HISTORY_KEY, SETTINGS_KEY};
use serde_json::json;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> Arc<FileStore> {
    Arc::new(FileStore::open(dir.path()).expect("Failed to open store"))
}

#[test]
fn test_history_survives_restart() {
    init_test_env();
    let dir = TempDir::new().unwrap();

    let first_id = {
        let mut history = SearchHistory::load(open_store(&dir));
        history.add("Long COVID neurology", 5, Some(12.5));
        history.add("hypertension guidelines", 3, None);
        history.entries()[1].id.clone()
    };

    let history = SearchHistory::load(open_store(&dir));
    assert_eq!(history.len(), 2);
    assert_eq!(history.entries()[0].query, "hypertension guidelines");
    assert_eq!(history.entries()[1].query, "long covid neurology");
    assert_eq!(history.entries()[1].id, first_id);
    assert_eq!(history.entries()[1].processing_time_seconds, Some(12.5));

    let restored = SearchHistory::restore(&history.entries()[1]);
    assert_eq!(restored.query, "long covid neurology");
    assert_eq!(restored.num_papers, 5);
}

#[test]
fn test_history_cap_on_disk() {
    init_test_env();
    let dir = TempDir::new().unwrap();

    let mut history = SearchHistory::load(open_store(&dir));
    for i in 0..(MAX_HISTORY_ENTRIES + 20) {
        history.add(&format!("query number {}", i), 5, None);
    }

    let reloaded = SearchHistory::load(open_store(&dir));
    assert_eq!(reloaded.len(), MAX_HISTORY_ENTRIES);
    assert_eq!(
        reloaded.entries()[0].query,
        format!("query number {}", MAX_HISTORY_ENTRIES + 19)
    );
}

#[test]
fn test_corrupt_files_load_as_defaults() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    store.set(HISTORY_KEY, "{not json").unwrap();
    store.set(SETTINGS_KEY, "[1, 2, 3]").unwrap();
    store.set(AUDIT_KEY, "\"just a string\"").unwrap();

    assert!(SearchHistory::load(store.clone()).is_empty());
    assert_eq!(SettingsManager::load(store.clone()).get(), &Default::default());
    assert!(AuditLog::new(store).events().is_empty());
}

#[test]
fn test_settings_survive_restart() {
    init_test_env();
    let dir = TempDir::new().unwrap();

    {
        let mut settings = SettingsManager::load(open_store(&dir));
        settings.set_model(ModelChoice::BioGpt);
        settings.set_length(SummaryLength::Brief);
        settings.set_schedule(Schedule::Weekly);
        settings.set_profile(Some("Cardiology".to_string()));
        for i in 0..(MAX_TRACKED_KEYWORDS + 5) {
            settings.add_keyword(&format!("keyword-{}", i));
        }
        settings.add_keyword("keyword-0");
    }

    let settings = SettingsManager::load(open_store(&dir));
    let record = settings.get();
    assert_eq!(record.model, ModelChoice::BioGpt);
    assert_eq!(record.length, SummaryLength::Brief);
    assert_eq!(record.schedule, Schedule::Weekly);
    assert_eq!(record.profile.as_deref(), Some("Cardiology"));
    assert_eq!(record.tracked_keywords.len(), MAX_TRACKED_KEYWORDS);
}

#[test]
fn test_settings_from_older_version() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    // Written before residency, schedule and keywords existed
    let old = json!({ "model": "claude", "temperature": 0.3, "hipaaMode": false });
    fs::write(dir.path().join(format!("{}.json", SETTINGS_KEY)), old.to_string()).unwrap();

    let settings = SettingsManager::load(store);
    let record = settings.get();
    assert_eq!(record.model, ModelChoice::Claude);
    assert_eq!(record.temperature, 0.3);
    assert!(!record.hipaa_mode);
    assert!(record.anonymize_phi);
    assert_eq!(record.schedule, Schedule::Off);
    assert!(record.tracked_keywords.is_empty());
}

#[test]
fn test_audit_survives_restart() {
    init_test_env();
    let dir = TempDir::new().unwrap();

    AuditLog::new(open_store(&dir)).log_event(
        AuditEventType::Copy,
        Some(audit::payload([("pmid", json!("38234567"))])),
    );

    let events = AuditLog::new(open_store(&dir)).events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, AuditEventType::Copy);

    let raw = fs::read_to_string(dir.path().join(format!("{}.json", AUDIT_KEY))).unwrap();
    assert!(raw.contains("\"type\":\"copy\""));
}
