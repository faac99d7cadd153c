//! Integration tests for ConfigManager and LocalStore
//!
//! These tests verify:
//! - Settings layering (defaults, YAML file, environment)
//! - Base URL normalization through the loaded settings
//! - Persisted preference records, including legacy field names
//! - Palette persistence

use camino::Utf8PathBuf;
use chrono::{TimeZone, Utc};
use std::fs;
use studyverse::config::local_store::{PALETTE_FILE, PREFERENCES_FILE};
use studyverse::models::DEFAULT_API_URL;
use studyverse::theme::PaletteName;
use studyverse::{AgeGroup, AppSettings, ConfigManager, PreferenceRecord, StylePreference};
use tempfile::TempDir;

fn setup_test_env() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = Utf8PathBuf::from_path_buf(temp_dir.path().join("StudyVerse Data")).unwrap();
    let manager = ConfigManager::new(&data_dir).unwrap();
    (temp_dir, manager)
}

fn no_env() -> Option<config::Map<String, String>> {
    Some(config::Map::new())
}

#[test]
fn test_defaults_without_file() {
    let (_temp, manager) = setup_test_env();
    let settings = manager.load_settings_with_env(no_env()).unwrap();

    assert_eq!(settings.api_base_url(), DEFAULT_API_URL);
    assert_eq!(settings.request_timeout_secs, 30);
    assert_eq!(settings.flashcard_count, 5);
    assert!(settings.auth_token().is_none());
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let (_temp, manager) = setup_test_env();
    fs::write(
        manager.settings_path(),
        "api_url: studyverse-api.onrender.com\nauth_token: abc123\n",
    )
    .unwrap();

    let settings = manager.load_settings_with_env(no_env()).unwrap();
    assert_eq!(
        settings.api_base_url(),
        "https://studyverse-api.onrender.com"
    );
    assert_eq!(settings.auth_token(), Some("abc123"));
    assert_eq!(settings.quiz_question_count, 5);
}

#[test]
fn test_env_overrides_file() {
    let (_temp, manager) = setup_test_env();
    manager
        .save_settings(&AppSettings {
            api_url: Some("http://localhost:8000".to_string()),
            debug_mode: false,
            ..AppSettings::default()
        })
        .unwrap();

    let mut env = config::Map::new();
    env.insert(
        "STUDYVERSE_API_URL".to_string(),
        "api.example.org/".to_string(),
    );
    env.insert("STUDYVERSE_DEBUG_MODE".to_string(), "true".to_string());
    env.insert("UNRELATED_API_URL".to_string(), "http://ignored".to_string());

    let settings = manager.load_settings_with_env(Some(env)).unwrap();
    assert_eq!(settings.api_base_url(), "https://api.example.org");
    assert!(settings.debug_mode);
}

#[test]
fn test_settings_round_trip_through_yaml() {
    let (_temp, manager) = setup_test_env();
    let settings = AppSettings {
        api_url: Some("https://studyverse.example".to_string()),
        request_timeout_secs: 45,
        flashcard_count: 10,
        quiz_question_count: 8,
        auth_token: Some("token".to_string()),
        debug_mode: true,
        log_to_console: true,
    };

    manager.save_settings(&settings).unwrap();
    let yaml = fs::read_to_string(manager.settings_path()).unwrap();
    assert!(yaml.contains("flashcard_count: 10"));

    assert_eq!(manager.load_settings_with_env(no_env()).unwrap(), settings);
}

#[test]
fn test_local_store_preferences() {
    let (_temp, manager) = setup_test_env();
    let store = manager.local_store();
    let record = PreferenceRecord::new(
        AgeGroup::Preschool,
        Some(StylePreference::Girl),
        "colors",
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap(),
    )
    .unwrap();

    store.save_preferences(&record).unwrap();
    assert!(manager.data_dir().join(PREFERENCES_FILE).exists());

    let json = fs::read_to_string(manager.data_dir().join(PREFERENCES_FILE)).unwrap();
    assert!(json.contains("\"age_group\": \"preschool\""));

    assert_eq!(store.load_preferences().unwrap(), Some(record));
}

#[test]
fn test_local_store_loads_legacy_record() {
    let (_temp, manager) = setup_test_env();
    fs::write(
        manager.data_dir().join(PREFERENCES_FILE),
        r#"{"age":"middle","gender":"neutral","theme":"gaming","timestamp":"2024-03-01T10:00:00Z"}"#,
    )
    .unwrap();

    let record = manager.local_store().load_preferences().unwrap().unwrap();
    assert_eq!(record.age_group(), AgeGroup::Middle);
    assert_eq!(record.style(), Some(StylePreference::Neutral));
    assert_eq!(record.theme(), "gaming");
    assert_eq!(
        record.confirmed_at(),
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    );
}

#[test]
fn test_local_store_rejects_theme_outside_age_group() {
    let (_temp, manager) = setup_test_env();
    fs::write(
        manager.data_dir().join(PREFERENCES_FILE),
        r#"{"age_group":"preschool","style":"boy","theme":"gaming","confirmed_at":"2024-03-01T10:00:00Z"}"#,
    )
    .unwrap();

    assert!(manager.local_store().load_preferences().is_err());
}

#[test]
fn test_local_store_palette() {
    let (_temp, manager) = setup_test_env();
    let store = manager.local_store();

    assert_eq!(store.load_palette().unwrap(), None);
    store.save_palette(PaletteName::Nature).unwrap();

    let raw = fs::read_to_string(manager.data_dir().join(PALETTE_FILE)).unwrap();
    assert_eq!(raw, "\"nature\"");
    assert_eq!(store.load_palette().unwrap(), Some(PaletteName::Nature));
}
