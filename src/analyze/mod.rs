//! Source inventory for the initial conversion.
//!
//! An inventory lists the iOS files and their roles. It is consulted once,
//! by `sdroid convert`, to seed the first mapping; the sync engine always
//! classifies on its own.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::Role;
use crate::sync::{Excludes, load_source, scan_swift_files};

/// One inventoried source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryEntry {
    /// Path relative to the iOS root, `/`-separated.
    pub path: String,
    pub role: Role,
    /// File stem.
    pub name: String,
}

/// Produces the list of source files and their roles.
pub trait Inventory {
    /// All entries, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns an error if the inventory source cannot be read.
    fn entries(&self) -> Result<Vec<InventoryEntry>>;
}

#[derive(Debug, Deserialize)]
struct ReportEntry {
    path: String,
    #[serde(default)]
    name: Option<String>,
}

/// Analyzer report. Only the per-role file lists are read.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AnalysisReport {
    model_files: Vec<ReportEntry>,
    viewmodel_files: Vec<ReportEntry>,
    view_files: Vec<ReportEntry>,
    service_files: Vec<ReportEntry>,
    extension_files: Vec<ReportEntry>,
    utility_files: Vec<ReportEntry>,
    test_files: Vec<ReportEntry>,
    other_files: Vec<ReportEntry>,
}

fn stem_of(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map_or_else(|| path.to_string(), |s| s.to_string_lossy().into_owned())
}

/// Inventory read from an analyzer's JSON report.
#[derive(Debug, Clone)]
pub struct JsonInventory {
    path: PathBuf,
}

impl JsonInventory {
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    fn parse(content: &str) -> std::result::Result<Vec<InventoryEntry>, serde_json::Error> {
        let report: AnalysisReport = serde_json::from_str(content)?;
        let groups = [
            (Role::Model, report.model_files),
            (Role::ViewModel, report.viewmodel_files),
            (Role::View, report.view_files),
            (Role::Service, report.service_files),
            (Role::Extension, report.extension_files),
            (Role::Utility, report.utility_files),
            (Role::Test, report.test_files),
            (Role::Other, report.other_files),
        ];

        let mut entries: Vec<InventoryEntry> = groups
            .into_iter()
            .flat_map(|(role, files)| {
                files.into_iter().map(move |f| InventoryEntry {
                    name: f.name.unwrap_or_else(|| stem_of(&f.path)),
                    path: f.path.replace('\\', "/"),
                    role,
                })
            })
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries.dedup_by(|a, b| a.path == b.path);
        Ok(entries)
    }
}

impl Inventory for JsonInventory {
    fn entries(&self) -> Result<Vec<InventoryEntry>> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            Error::Config(format!("Cannot read analysis report {}: {e}", self.path.display()))
        })?;
        let entries = Self::parse(&content).map_err(|e| {
            Error::Config(format!("Invalid analysis report {}: {e}", self.path.display()))
        })?;
        debug!(count = entries.len(), report = %self.path.display(), "Loaded analysis report");
        Ok(entries)
    }
}

/// Inventory built by walking and classifying the iOS tree.
#[derive(Debug, Clone)]
pub struct ScanInventory {
    root: PathBuf,
    excludes: Excludes,
}

impl ScanInventory {
    #[must_use]
    pub fn new(root: &Path, excludes: Excludes) -> Self {
        Self {
            root: root.to_path_buf(),
            excludes,
        }
    }
}

impl Inventory for ScanInventory {
    fn entries(&self) -> Result<Vec<InventoryEntry>> {
        let mut entries = Vec::new();
        for (rel, _) in scan_swift_files(&self.root, &self.excludes) {
            let source = match load_source(&self.root, &rel) {
                Ok(s) => s,
                Err(e) => {
                    warn!(path = %rel, "Cannot read source file: {e}");
                    continue;
                }
            };
            entries.push(InventoryEntry {
                role: source.role,
                name: stem_of(&rel),
                path: rel,
            });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_json_inventory_reads_categories() {
        let dir = TempDir::new().unwrap();
        let report = dir.path().join("analysis.json");
        fs::write(
            &report,
            r#"{
                "project_name": "Demo",
                "total_swift_files": 3,
                "model_files": [{"path": "Models/User.swift", "name": "User", "line_count": 10}],
                "viewmodel_files": [{"path": "ViewModels/UserViewModel.swift", "name": "UserViewModel"}],
                "test_files": [{"path": "Tests/UserTests.swift"}]
            }"#,
        )
        .unwrap();

        let entries = JsonInventory::new(&report).entries().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].path, "Models/User.swift");
        assert_eq!(entries[0].role, Role::Model);
        assert_eq!(entries[1].name, "UserTests");
        assert_eq!(entries[1].role, Role::Test);
        assert_eq!(entries[2].role, Role::ViewModel);
    }

    #[test]
    fn test_json_inventory_errors_are_config_errors() {
        let dir = TempDir::new().unwrap();
        let missing = JsonInventory::new(&dir.path().join("nope.json")).entries();
        assert!(matches!(missing, Err(Error::Config(_))));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "not json").unwrap();
        assert!(matches!(JsonInventory::new(&bad).entries(), Err(Error::Config(_))));
    }

    #[test]
    fn test_scan_inventory_classifies() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("Models")).unwrap();
        fs::create_dir_all(dir.path().join("Pods")).unwrap();
        fs::write(dir.path().join("Models/Profile.swift"), "struct Profile: Codable {}\n").unwrap();
        fs::write(dir.path().join("Pods/Lib.swift"), "struct Lib {}\n").unwrap();

        let entries = ScanInventory::new(dir.path(), Excludes::default()).entries().unwrap();
        assert_eq!(
            entries,
            vec![InventoryEntry {
                path: "Models/Profile.swift".into(),
                role: Role::Model,
                name: "Profile".into(),
            }]
        );
    }
}
