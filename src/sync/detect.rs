//! Change detection.
//!
//! Compares the current iOS tree against the checksum table of the last
//! recorded run and produces the three-way delta (added, modified, deleted).
//! Detection is read-only; nothing here touches the Android tree.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::model::{FileChange, SyncState};
use crate::sync::hash::{has_changed, hash_file};

/// Directory names never descended into.
pub const DEFAULT_EXCLUDES: [&str; 6] = ["Pods", "Carthage", "build", ".build", "DerivedData", ".git"];

/// Extension of the files the detector enumerates.
const SWIFT_EXTENSION: &str = "swift";

/// Directory-name exclusion list.
#[derive(Debug, Clone)]
pub struct Excludes {
    names: Vec<String>,
}

impl Default for Excludes {
    fn default() -> Self {
        Self::with_extra(&[])
    }
}

impl Excludes {
    /// The default list plus user-configured names.
    #[must_use]
    pub fn with_extra(extra: &[String]) -> Self {
        let mut names: Vec<String> = DEFAULT_EXCLUDES.iter().map(|s| (*s).to_string()).collect();
        for name in extra {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        Self { names }
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Whether any directory component of a relative path is excluded.
    #[must_use]
    pub fn excludes_path(&self, relative_path: &str) -> bool {
        relative_path
            .split('/')
            .rev()
            .skip(1)
            .any(|component| self.is_excluded(component))
    }
}

/// `/`-separated path of `path` relative to `root`.
#[must_use]
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

/// Enumerate Swift files under `root`, pruning excluded directories.
///
/// Returns `(relative_path, absolute_path)` pairs sorted by relative path.
/// Walk errors (unreadable directories) are logged and skipped.
#[must_use]
pub fn scan_swift_files(root: &Path, excludes: &Excludes) -> Vec<(String, PathBuf)> {
    let keep = |entry: &DirEntry| {
        entry.depth() == 0
            || !entry.file_type().is_dir()
            || !excludes.is_excluded(&entry.file_name().to_string_lossy())
    };

    let mut files: Vec<(String, PathBuf)> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(keep)
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("Skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == SWIFT_EXTENSION))
        .filter_map(|e| relative_path(root, e.path()).map(|rel| (rel, e.into_path())))
        .collect();

    files.sort_by(|a, b| a.0.cmp(&b.0));
    files
}

/// Result of one detection pass.
#[derive(Debug, Default)]
pub struct Detection {
    /// Added and modified by path, then deleted by path.
    pub changes: Vec<FileChange>,
    /// Files that were enumerated but could not be hashed.
    pub unreadable: Vec<String>,
}

/// Detect changes between the iOS tree at `root` and `state`.
///
/// Hashing runs on the rayon pool; every result is collected before the
/// delta is computed. A file that cannot be hashed is excluded from both
/// sides: it is neither added/modified nor reported as deleted.
#[must_use]
pub fn detect_changes(root: &Path, state: &SyncState, excludes: &Excludes) -> Detection {
    let files = scan_swift_files(root, excludes);
    debug!(count = files.len(), "Enumerated Swift files");

    let hashed: Vec<(String, std::io::Result<String>)> = files
        .par_iter()
        .map(|(rel, abs)| (rel.clone(), hash_file(abs)))
        .collect();

    let mut current: BTreeMap<String, String> = BTreeMap::new();
    let mut unreadable = Vec::new();
    for (rel, result) in hashed {
        match result {
            Ok(hash) => {
                current.insert(rel, hash);
            }
            Err(e) => {
                warn!(path = %rel, "Cannot read source file: {e}");
                unreadable.push(rel);
            }
        }
    }

    let mut changes = Vec::new();

    for (rel, hash) in &current {
        match state.checksums.get(rel) {
            None => changes.push(FileChange::added(rel.clone(), hash.clone())),
            Some(old) if has_changed(hash, Some(old.as_str())) => changes.push(FileChange::modified(
                rel.clone(),
                state.target_for(rel).map(str::to_string),
                old.clone(),
                hash.clone(),
            )),
            Some(_) => {}
        }
    }

    for (rel, old) in &state.checksums {
        if current.contains_key(rel) || unreadable.contains(rel) {
            continue;
        }
        // A state recorded with a wider exclusion list than today's is not
        // grounds for deleting anything the walk simply never visited.
        if excludes.excludes_path(rel) {
            continue;
        }
        changes.push(FileChange::deleted(
            rel.clone(),
            state.target_for(rel).map(str::to_string),
            old.clone(),
        ));
    }

    Detection {
        changes,
        unreadable,
    }
}
