//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::PathBuf;

use chrono::NaiveDate;
use changelog_manager::{Changelog, ChangelogConfig};

/// Get the path to test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Get the path to a changelog fixture.
pub fn changelog_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("changelogs").join(name)
}

/// Read a fixture file as a string.
pub fn read_fixture(path: PathBuf) -> String {
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {:?}: {}", path, e))
}

/// Load a changelog fixture with the given config.
pub fn load_with(name: &str, config: ChangelogConfig) -> Changelog {
    let content = read_fixture(changelog_fixture(name));
    Changelog::new(&content, config)
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Load a changelog fixture with the default config.
pub fn load(name: &str) -> Changelog {
    load_with(name, ChangelogConfig::default())
}

/// Release date used by tests that need a stable rendering.
pub fn release_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date")
}

/// Create a temporary directory for test output.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}
