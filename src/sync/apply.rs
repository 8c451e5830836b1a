//! Applying one change to the Android tree.
//!
//! Every [`FileChange`] ends in exactly one [`Outcome`]. Failures here are
//! per-file [`ApplyError`]s: they end that file's processing and nothing
//! else. Nothing in this module touches the sync state; the engine decides
//! what to record from the outcome.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::convert::{Pipeline, generate, paths};
use crate::model::{ChangeKind, FileChange};
use crate::sync::base::BaseStore;
use crate::sync::file::{atomic_write, load_source};

/// First line of the existing-content half of a conflict.
pub const CONFLICT_LOCAL: &str = "// <<<<<<< ANDROID (local)";
/// First line of the generated half of a conflict.
pub const CONFLICT_INCOMING: &str = "// >>>>>>> iOS (incoming)";

/// Per-file failure. Carries the path it failed on.
#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("failed to read {}: {source}", path.display())]
    ReadTarget { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to remove {}: {source}", path.display())]
    Remove { path: PathBuf, source: io::Error },
}

/// Why a change was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Test sources are never converted.
    Policy,
    /// The source could not be read.
    Unreadable,
    /// Declined during interactive review.
    Rejected,
}

impl SkipReason {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Policy => "test file",
            Self::Unreadable => "unreadable",
            Self::Rejected => "rejected",
        }
    }
}

/// What a clean write did to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    Created,
    Updated,
    /// Target already held the generated text. Nothing was written.
    Unchanged,
}

impl WriteAction {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Terminal state of one change.
#[derive(Debug)]
pub enum Outcome {
    Skipped(SkipReason),
    Written {
        target: String,
        action: WriteAction,
        generated: String,
        marker: Option<String>,
    },
    ConflictWritten {
        target: String,
        generated: String,
    },
    Deleted {
        target: Option<String>,
        removed: bool,
    },
    Failed(ApplyError),
}

impl Outcome {
    /// Short outcome name for reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Skipped(_) => "skipped",
            Self::Written { .. } => "written",
            Self::ConflictWritten { .. } => "conflict",
            Self::Deleted { .. } => "deleted",
            Self::Failed(_) => "failed",
        }
    }

    /// Android-relative path the outcome concerns, if any.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Written { target, .. } | Self::ConflictWritten { target, .. } => Some(target),
            Self::Deleted { target, .. } => target.as_deref(),
            Self::Skipped(_) | Self::Failed(_) => None,
        }
    }

    /// Human-readable detail: the skip reason, write action or error.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Skipped(reason) => Some(reason.as_str().to_string()),
            Self::Written { action, .. } => Some(action.as_str().to_string()),
            Self::Deleted { removed: false, .. } => Some("target already absent".to_string()),
            Self::Failed(e) => Some(e.to_string()),
            Self::ConflictWritten { .. } | Self::Deleted { removed: true, .. } => None,
        }
    }
}

/// Wrap both versions of a file in conflict delimiters, existing first.
#[must_use]
pub fn conflict_document(existing: &str, generated: &str) -> String {
    format!(
        "{CONFLICT_LOCAL}\n\
         // The following is the existing Android code.\n\
         // Review and merge with the iOS changes below.\n\
         // =======\n\
         \n\
         {existing}\n\
         \n\
         {CONFLICT_INCOMING}\n\
         // The following is the converted iOS code.\n\
         // =======\n\
         \n\
         {generated}\n"
    )
}

/// Whether a file still holds conflict delimiters from an earlier sync.
#[must_use]
pub fn has_conflict_markers(text: &str) -> bool {
    text.lines()
        .any(|line| line.starts_with(CONFLICT_LOCAL) || line.starts_with(CONFLICT_INCOMING))
}

/// Applies changes from one iOS tree to one Android tree.
#[derive(Debug)]
pub struct Applier<'a> {
    ios_root: &'a Path,
    android_root: &'a Path,
    package_name: &'a str,
    pipeline: &'a Pipeline,
    dry_run: bool,
}

impl<'a> Applier<'a> {
    #[must_use]
    pub const fn new(
        ios_root: &'a Path,
        android_root: &'a Path,
        package_name: &'a str,
        pipeline: &'a Pipeline,
    ) -> Self {
        Self {
            ios_root,
            android_root,
            package_name,
            pipeline,
            dry_run: false,
        }
    }

    /// Report outcomes without touching the Android tree.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Apply one change.
    ///
    /// `bases` is consulted for the last generated text of the file; it is
    /// never modified here.
    pub fn apply(&self, change: &FileChange, bases: &BaseStore) -> Outcome {
        match change.kind {
            ChangeKind::Deleted => self.apply_deletion(change),
            ChangeKind::Added | ChangeKind::Modified => self.apply_update(change, bases),
        }
    }

    fn apply_deletion(&self, change: &FileChange) -> Outcome {
        let Some(target) = change.target_path.clone() else {
            debug!(path = %change.source_path, "Deleted source had no mapped target");
            return Outcome::Deleted {
                target: None,
                removed: false,
            };
        };

        let abs = self.android_root.join(&target);
        if !abs.exists() {
            debug!(target = %target, "Mapped target already absent");
            return Outcome::Deleted {
                target: Some(target),
                removed: false,
            };
        }

        if !self.dry_run {
            if let Err(source) = fs::remove_file(&abs) {
                return Outcome::Failed(ApplyError::Remove { path: abs, source });
            }
        }
        info!(target = %target, "Deleted");
        Outcome::Deleted {
            target: Some(target),
            removed: true,
        }
    }

    fn apply_update(&self, change: &FileChange, bases: &BaseStore) -> Outcome {
        let source = match load_source(self.ios_root, &change.source_path) {
            Ok(s) => s,
            Err(e) => {
                warn!(path = %change.source_path, "Skipping unreadable source: {e}");
                return Outcome::Skipped(SkipReason::Unreadable);
            }
        };

        let role = source.role;
        if !role.is_convertible() {
            info!(path = %change.source_path, "Skipping test file");
            return Outcome::Skipped(SkipReason::Policy);
        }

        let target = change
            .target_path
            .clone()
            .unwrap_or_else(|| paths::resolve(&change.source_path, role, self.package_name));
        debug!(path = %change.source_path, %role, target = %target, "Converting");

        let result = generate(
            &change.source_path,
            &source.raw_content,
            &target,
            self.package_name,
            self.pipeline,
        );
        let abs = self.android_root.join(&target);

        let existing = match fs::read(&abs) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(source) => return Outcome::Failed(ApplyError::ReadTarget { path: abs, source }),
        };

        let (document, action) = match existing {
            None => (None, Some(WriteAction::Created)),
            Some(current) if current == result.content => (None, Some(WriteAction::Unchanged)),
            Some(current) if bases.get(&change.source_path).as_deref() == Some(current.as_str()) => {
                (None, Some(WriteAction::Updated))
            }
            Some(current) => {
                if has_conflict_markers(&current) {
                    warn!(target = %target, "Target still has unresolved conflict markers");
                }
                (Some(conflict_document(&current, &result.content)), None)
            }
        };

        if action == Some(WriteAction::Unchanged) {
            debug!(target = %target, "Target already up to date");
        } else if !self.dry_run {
            let text = document.as_deref().unwrap_or(&result.content);
            if let Err(source) = atomic_write(&abs, text) {
                return Outcome::Failed(ApplyError::Write { path: abs, source });
            }
        }

        match action {
            Some(action) => {
                info!(target = %target, action = action.as_str(), "Wrote");
                Outcome::Written {
                    target,
                    action,
                    generated: result.content,
                    marker: result.marker,
                }
            }
            None => {
                warn!(target = %target, "Target was edited by hand; wrote conflict");
                Outcome::ConflictWritten {
                    target,
                    generated: result.content,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::hash::content_hash;
    use tempfile::TempDir;

    const PKG: &str = "com.example.app";
    const PROFILE_KT: &str = "app/src/main/java/com/example/app/model/Profile.kt";

    struct Fixture {
        ios: TempDir,
        android: TempDir,
        pipeline: Pipeline,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                ios: TempDir::new().unwrap(),
                android: TempDir::new().unwrap(),
                pipeline: Pipeline::swift_to_kotlin(),
            }
        }

        fn write_ios(&self, rel: &str, content: &str) {
            let path = self.ios.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        fn write_android(&self, rel: &str, content: &str) {
            let path = self.android.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        fn read_android(&self, rel: &str) -> String {
            fs::read_to_string(self.android.path().join(rel)).unwrap()
        }

        fn applier(&self) -> Applier<'_> {
            Applier::new(self.ios.path(), self.android.path(), PKG, &self.pipeline)
        }

        fn bases(&self) -> BaseStore {
            BaseStore::new(self.android.path())
        }
    }

    fn added(rel: &str) -> FileChange {
        FileChange::added(rel.to_string(), content_hash(b"new"))
    }

    fn modified(rel: &str, target: &str) -> FileChange {
        FileChange::modified(
            rel.to_string(),
            Some(target.to_string()),
            content_hash(b"old"),
            content_hash(b"new"),
        )
    }

    #[test]
    fn test_added_model_is_created_at_resolved_path() {
        let fx = Fixture::new();
        fx.write_ios("Models/Profile.swift", "struct Profile: Codable {\n    let id: Int\n}\n");

        let outcome = fx.applier().apply(&added("Models/Profile.swift"), &fx.bases());
        assert!(matches!(
            outcome,
            Outcome::Written { action: WriteAction::Created, .. }
        ));
        assert_eq!(outcome.target(), Some(PROFILE_KT));

        let written = fx.read_android(PROFILE_KT);
        assert!(written.starts_with("package com.example.app.model\n"));
        assert!(written.contains("// TODO: VERIFY - Synced from Models/Profile.swift"));
        assert!(written.contains("data class Profile: Codable {\n    val id: Int\n}"));
    }

    #[test]
    fn test_test_files_are_skipped_by_policy() {
        let fx = Fixture::new();
        fx.write_ios("AppTests/ProfileTests.swift", "func testA() {}\n");

        let outcome = fx.applier().apply(&added("AppTests/ProfileTests.swift"), &fx.bases());
        assert!(matches!(outcome, Outcome::Skipped(SkipReason::Policy)));
    }

    #[test]
    fn test_missing_source_is_skipped_as_unreadable() {
        let fx = Fixture::new();
        let outcome = fx.applier().apply(&added("Gone.swift"), &fx.bases());
        assert!(matches!(outcome, Outcome::Skipped(SkipReason::Unreadable)));
    }

    #[test]
    fn test_identical_target_is_not_rewritten() {
        let fx = Fixture::new();
        fx.write_ios("Models/Profile.swift", "struct Profile {}\n");
        let first = fx.applier().apply(&added("Models/Profile.swift"), &fx.bases());
        assert!(matches!(first, Outcome::Written { action: WriteAction::Created, .. }));

        let second = fx
            .applier()
            .apply(&modified("Models/Profile.swift", PROFILE_KT), &fx.bases());
        assert!(matches!(second, Outcome::Written { action: WriteAction::Unchanged, .. }));
        assert!(!has_conflict_markers(&fx.read_android(PROFILE_KT)));
    }

    #[test]
    fn test_untouched_target_is_updated_silently() {
        let fx = Fixture::new();
        fx.write_ios("Models/Profile.swift", "struct Profile {}\n");
        let mut bases = fx.bases();
        let Outcome::Written { generated, .. } =
            fx.applier().apply(&added("Models/Profile.swift"), &bases)
        else {
            panic!("expected a clean write");
        };
        bases.stage("Models/Profile.swift", generated);
        bases.commit();

        fx.write_ios("Models/Profile.swift", "struct Profile {\n    let name: String\n}\n");
        let outcome = fx
            .applier()
            .apply(&modified("Models/Profile.swift", PROFILE_KT), &bases);

        assert!(matches!(outcome, Outcome::Written { action: WriteAction::Updated, .. }));
        let written = fx.read_android(PROFILE_KT);
        assert!(written.contains("val name: String"));
        assert!(!has_conflict_markers(&written));
    }

    #[test]
    fn test_hand_edited_target_gets_conflict() {
        let fx = Fixture::new();
        fx.write_ios("Models/Profile.swift", "struct Profile {\n    let name: String\n}\n");
        fx.write_android(PROFILE_KT, "package com.example.app.model\n\n// hand edited\n");

        let outcome = fx
            .applier()
            .apply(&modified("Models/Profile.swift", PROFILE_KT), &fx.bases());
        assert!(matches!(outcome, Outcome::ConflictWritten { .. }));

        let written = fx.read_android(PROFILE_KT);
        let local = written.find(CONFLICT_LOCAL).unwrap();
        let incoming = written.find(CONFLICT_INCOMING).unwrap();
        let edit = written.find("// hand edited").unwrap();
        let generated = written.find("val name: String").unwrap();
        assert!(local < edit && edit < incoming && incoming < generated);
    }

    #[test]
    fn test_existing_mapping_wins_over_resolver() {
        let fx = Fixture::new();
        fx.write_ios("Models/Profile.swift", "struct Profile {}\n");
        let moved = "app/src/main/java/com/example/app/data/Profile.kt";

        let outcome = fx
            .applier()
            .apply(&modified("Models/Profile.swift", moved), &fx.bases());
        assert_eq!(outcome.target(), Some(moved));
        assert!(fx.read_android(moved).starts_with("package com.example.app.data\n"));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let fx = Fixture::new();
        fx.write_ios("Models/Profile.swift", "struct Profile {}\n");
        fx.write_android("app/Old.kt", "old");

        let applier = fx.applier().dry_run(true);
        let created = applier.apply(&added("Models/Profile.swift"), &fx.bases());
        assert!(matches!(created, Outcome::Written { action: WriteAction::Created, .. }));
        assert!(!fx.android.path().join(PROFILE_KT).exists());

        let deletion = FileChange::deleted("Old.swift".into(), Some("app/Old.kt".into()), "h".into());
        let deleted = applier.apply(&deletion, &fx.bases());
        assert!(matches!(deleted, Outcome::Deleted { removed: true, .. }));
        assert!(fx.android.path().join("app/Old.kt").exists());
    }

    #[test]
    fn test_deletion_removes_mapped_target() {
        let fx = Fixture::new();
        let target = "app/src/main/java/com/example/app/util/OldHelper.kt";
        fx.write_android(target, "object OldHelper");

        let change = FileChange::deleted("Utils/OldHelper.swift".into(), Some(target.into()), "h".into());
        let outcome = fx.applier().apply(&change, &fx.bases());
        assert!(matches!(outcome, Outcome::Deleted { removed: true, .. }));
        assert!(!fx.android.path().join(target).exists());

        // Second time round the target is gone; still a deletion.
        let again = fx.applier().apply(&change, &fx.bases());
        assert!(matches!(again, Outcome::Deleted { removed: false, .. }));
    }

    #[test]
    fn test_unwritable_target_fails_only_that_file() {
        let fx = Fixture::new();
        fx.write_ios("Models/Profile.swift", "struct Profile {}\n");
        // A directory where the target's parent should be.
        fx.write_android("app/src/main/java/com/example/app/model", "not a dir");

        let outcome = fx.applier().apply(&added("Models/Profile.swift"), &fx.bases());
        assert!(matches!(outcome, Outcome::Failed(_)));
        assert_eq!(outcome.label(), "failed");
    }

    #[test]
    fn test_conflict_marker_detection() {
        let doc = conflict_document("a", "b");
        assert!(has_conflict_markers(&doc));
        assert!(!has_conflict_markers("package a\n// regular comment\n"));
    }
}
