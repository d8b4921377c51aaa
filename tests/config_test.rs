//! Config file tests

use roster_import::config::Config;
use roster_import::error::RosterImportError;
use tempfile::tempdir;

/// Missing file falls back to defaults
#[test]
fn test_load_missing_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = Config::load_from(&dir.path().join("config.json")).expect("load");
    assert_eq!(config, Config::default());
}

/// set, save and load again
#[test]
fn test_save_and_load() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("config.json");

    let mut config = Config::default();
    config.set("min_name_similarity=0.9").unwrap();
    config.set("infer_from_missing_rating=true").unwrap();
    config.save_to(&path).expect("save");

    let loaded = Config::load_from(&path).expect("load");
    assert_eq!(loaded, config);
    assert!(loaded.to_import_options().unrated.infer_from_missing_rating);
    assert!((loaded.to_match_options().min_name_similarity - 0.9).abs() < 1e-9);
}

/// Corrupt file is a JSON error, not silent defaults
#[test]
fn test_load_corrupt_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = Config::load_from(&path);
    assert!(matches!(result, Err(RosterImportError::JsonParse(_))));
}
