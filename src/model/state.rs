//! Persisted sync state.
//!
//! One `SyncState` exists per Android project, stored as
//! `<android>/.ios-android-sync.json`. It anchors incremental syncs: the
//! checksum table says which iOS files have been seen and at what content,
//! the mapping says where each one landed on the Android side.
//!
//! Both tables are keyed by the iOS-relative path. Every mapped path is also
//! checksummed; the reverse does not hold (test files are checksummed but
//! never mapped).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// File name of the sync state inside the Android project root.
pub const STATE_FILE_NAME: &str = ".ios-android-sync.json";

/// Snapshot of the last successful conversion or sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    /// RFC 3339 timestamp of the last run that recorded changes.
    pub last_sync_date: String,

    /// Git commit of the iOS project at that run, if it was a git checkout.
    pub ios_commit: Option<String>,

    /// Absolute path of the iOS project.
    pub ios_path: String,

    /// Absolute path of the Android project.
    pub android_path: String,

    /// Android package identifier (e.g. `com.example.app`).
    pub package_name: String,

    /// iOS-relative path -> Android-relative path.
    #[serde(default)]
    pub file_mapping: BTreeMap<String, String>,

    /// iOS-relative path -> content hash at the last recorded run.
    #[serde(default)]
    pub checksums: BTreeMap<String, String>,
}

impl SyncState {
    /// Create an empty baseline for a freshly converted project.
    #[must_use]
    pub fn new(ios_path: String, android_path: String, package_name: String) -> Self {
        Self {
            last_sync_date: chrono::Utc::now().to_rfc3339(),
            ios_commit: None,
            ios_path,
            android_path,
            package_name,
            file_mapping: BTreeMap::new(),
            checksums: BTreeMap::new(),
        }
    }

    /// Record a converted file: mapping and checksum land together.
    pub fn record(&mut self, source_path: &str, target_path: &str, hash: &str) {
        self.file_mapping
            .insert(source_path.to_string(), target_path.to_string());
        self.checksums
            .insert(source_path.to_string(), hash.to_string());
    }

    /// Record a file that is tracked but intentionally not converted.
    pub fn acknowledge(&mut self, source_path: &str, hash: &str) {
        self.checksums
            .insert(source_path.to_string(), hash.to_string());
    }

    /// Forget a file entirely: mapping and checksum leave together.
    pub fn forget(&mut self, source_path: &str) {
        self.file_mapping.remove(source_path);
        self.checksums.remove(source_path);
    }

    /// Mapped target path for a source path, if any.
    #[must_use]
    pub fn target_for(&self, source_path: &str) -> Option<&str> {
        self.file_mapping.get(source_path).map(String::as_str)
    }

    /// Some source other than `source_path` already mapped to `target_path`.
    #[must_use]
    pub fn other_source_for(&self, target_path: &str, source_path: &str) -> Option<&str> {
        self.file_mapping
            .iter()
            .find(|(src, target)| target.as_str() == target_path && src.as_str() != source_path)
            .map(|(src, _)| src.as_str())
    }

    /// Mapping keys that have no checksum. Empty for any state written by a
    /// completed run.
    #[must_use]
    pub fn untracked_mappings(&self) -> Vec<&str> {
        self.file_mapping
            .keys()
            .filter(|k| !self.checksums.contains_key(*k))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_state() -> SyncState {
        SyncState::new(
            "/work/ios".to_string(),
            "/work/android".to_string(),
            "com.example.app".to_string(),
        )
    }

    #[test]
    fn test_other_source_for_ignores_own_mapping() {
        let mut state = make_state();
        state.record("A/Models/Profile.swift", "app/model/Profile.kt", "h1");
        assert_eq!(state.other_source_for("app/model/Profile.kt", "A/Models/Profile.swift"), None);
        assert_eq!(
            state.other_source_for("app/model/Profile.kt", "B/Models/Profile.swift"),
            Some("A/Models/Profile.swift")
        );
        assert_eq!(state.other_source_for("app/model/Other.kt", "B/Models/Profile.swift"), None);
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let mut state = make_state();
        state.record("Models/Profile.swift", "app/src/main/java/com/example/app/model/Profile.kt", "abc");

        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("lastSyncDate").is_some());
        assert!(json["iosCommit"].is_null());
        assert_eq!(json["iosPath"], "/work/ios");
        assert_eq!(json["androidPath"], "/work/android");
        assert_eq!(json["packageName"], "com.example.app");
        assert_eq!(json["checksums"]["Models/Profile.swift"], "abc");
    }

    #[test]
    fn test_missing_tables_default_to_empty() {
        let json = r#"{
            "lastSyncDate": "2025-01-20T10:00:00+00:00",
            "iosCommit": null,
            "iosPath": "/ios",
            "androidPath": "/android",
            "packageName": "com.example"
        }"#;
        let state: SyncState = serde_json::from_str(json).unwrap();
        assert!(state.file_mapping.is_empty());
        assert!(state.checksums.is_empty());
    }

    #[test]
    fn test_record_and_forget_move_together() {
        let mut state = make_state();
        state.record("A.swift", "app/A.kt", "h1");
        assert_eq!(state.target_for("A.swift"), Some("app/A.kt"));
        assert!(state.untracked_mappings().is_empty());

        state.forget("A.swift");
        assert!(state.target_for("A.swift").is_none());
        assert!(!state.checksums.contains_key("A.swift"));
    }

    #[test]
    fn test_acknowledge_tracks_without_mapping() {
        let mut state = make_state();
        state.acknowledge("Tests/ProfileTests.swift", "h2");
        assert!(state.checksums.contains_key("Tests/ProfileTests.swift"));
        assert!(state.file_mapping.is_empty());
    }

    #[test]
    fn test_untracked_mappings_detects_hand_edited_state() {
        let mut state = make_state();
        state
            .file_mapping
            .insert("Orphan.swift".to_string(), "app/Orphan.kt".to_string());
        assert_eq!(state.untracked_mappings(), vec!["Orphan.swift"]);
    }
}
