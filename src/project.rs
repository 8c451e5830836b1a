//! Initial conversion of an iOS project.
//!
//! Scaffolds the Android tree, converts the model and view-model sources the
//! inventory lists, and writes the first sync state. Seeded files go through
//! [`generate`] exactly like sync does, and their generated text is stored
//! as the merge base, so the first sync sees them as untouched.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analyze::Inventory;
use crate::config::current_git_revision;
use crate::convert::{Pipeline, generate, paths};
use crate::error::{Error, Result};
use crate::model::{Role, SyncState};
use crate::scaffold::{ProjectSettings, Scaffolder};
use crate::sync::{BaseStore, atomic_write, load_source, save_state, state_path};

/// Roles converted during the initial conversion.
pub const SEEDED_ROLES: [Role; 2] = [Role::Model, Role::ViewModel];

/// One converted source file.
#[derive(Debug, Clone, Serialize)]
pub struct SeededFile {
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
}

/// Result of `sdroid convert`.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertReport {
    pub package_name: String,
    pub app_name: String,
    pub ios_commit: Option<String>,
    /// Scaffold files written, Android-relative.
    pub scaffolded: Vec<String>,
    pub seeded: Vec<SeededFile>,
    /// Inventory entries that were not seeded, with the reason.
    pub skipped: Vec<(String, String)>,
    /// Total inventory size.
    pub inventoried: usize,
}

fn absolute(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Convert `ios_root` into a fresh Android project at `android_root`.
///
/// Without `force`, an existing sync state is refused and existing files
/// (scaffold or seeded) are kept. A kept seeded file is not recorded; the
/// first sync treats its source as new and conflicts rather than overwrite.
///
/// # Errors
///
/// - [`Error::SourceNotFound`] if the iOS root is not a directory
/// - [`Error::AlreadyInitialized`] if a state exists and `force` is off
/// - Inventory, scaffold and state write failures
pub fn convert_project(
    ios_root: &Path,
    android_root: &Path,
    settings: &ProjectSettings,
    force: bool,
    scaffolder: &dyn Scaffolder,
    inventory: &dyn Inventory,
    pipeline: &Pipeline,
) -> Result<ConvertReport> {
    if !ios_root.is_dir() {
        return Err(Error::SourceNotFound {
            path: ios_root.to_path_buf(),
        });
    }
    if state_path(android_root).exists() && !force {
        return Err(Error::AlreadyInitialized {
            path: android_root.to_path_buf(),
        });
    }
    if !settings.package_name.contains('.') {
        return Err(Error::InvalidArgument(format!(
            "Package name must be a dotted identifier, got '{}'",
            settings.package_name
        )));
    }

    let entries = inventory.entries()?;
    fs::create_dir_all(android_root)?;
    let scaffolded = scaffolder.scaffold(android_root, settings, force)?;

    let mut state = SyncState::new(
        absolute(ios_root).to_string_lossy().into_owned(),
        absolute(android_root).to_string_lossy().into_owned(),
        settings.package_name.clone(),
    );
    let mut bases = BaseStore::new(android_root);
    let mut seeded = Vec::new();
    let mut skipped = Vec::new();

    for entry in &entries {
        if !SEEDED_ROLES.contains(&entry.role) {
            continue;
        }
        let source = match load_source(ios_root, &entry.path) {
            Ok(s) => s,
            Err(e) => {
                warn!(path = %entry.path, "Cannot read source file: {e}");
                skipped.push((entry.path.clone(), "unreadable".to_string()));
                continue;
            }
        };

        let target = paths::resolve(&entry.path, entry.role, &settings.package_name);
        let target_abs = android_root.join(&target);
        if target_abs.exists() && !force {
            debug!(path = %target, "Keeping existing file");
            skipped.push((entry.path.clone(), "target exists".to_string()));
            continue;
        }

        let generated = generate(&entry.path, &source.raw_content, &target, &settings.package_name, pipeline);
        atomic_write(&target_abs, &generated.content)?;
        state.record(&entry.path, &target, &source.content_hash);
        bases.stage(&entry.path, generated.content);
        info!(source = %entry.path, target = %target, "Converted");
        seeded.push(SeededFile {
            source: entry.path.clone(),
            target,
            marker: generated.marker,
        });
    }

    state.ios_commit = current_git_revision(ios_root);
    bases.commit();
    save_state(android_root, &state)?;

    Ok(ConvertReport {
        package_name: settings.package_name.clone(),
        app_name: settings.app_name.clone(),
        ios_commit: state.ios_commit,
        scaffolded,
        seeded,
        skipped,
        inventoried: entries.len(),
    })
}
