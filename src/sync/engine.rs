//! The sync run.
//!
//! Load the baseline, detect, filter, review, apply, then commit the next
//! state with one atomic write. The next state is built in memory from the
//! outcomes of changes that were actually applied; anything rejected,
//! filtered out or failed is left as it was, so the next run detects it
//! again.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{current_git_revision, git_changed_since};
use crate::convert::Pipeline;
use crate::error::{Error, Result};
use crate::model::{ChangeKind, FileChange, SyncState};
use crate::sync::apply::{Applier, Outcome, SkipReason};
use crate::sync::base::BaseStore;
use crate::sync::detect::detect_changes;
use crate::sync::file::{load_state, save_state};
use crate::sync::review::{Decision, Reviewer};
use crate::sync::types::{ChangeCounts, ChangeRecord, SyncOptions, SyncReport};

/// Incremental sync between one iOS tree and one Android tree.
#[derive(Debug)]
pub struct Synchronizer {
    ios_root: PathBuf,
    android_root: PathBuf,
    pipeline: Pipeline,
    options: SyncOptions,
}

/// Fail unless both project roots are directories.
///
/// # Errors
///
/// [`Error::SourceNotFound`] or [`Error::TargetNotFound`].
pub fn check_roots(ios_root: &Path, android_root: &Path) -> Result<()> {
    if !ios_root.is_dir() {
        return Err(Error::SourceNotFound {
            path: ios_root.to_path_buf(),
        });
    }
    if !android_root.is_dir() {
        return Err(Error::TargetNotFound {
            path: android_root.to_path_buf(),
        });
    }
    Ok(())
}

impl Synchronizer {
    #[must_use]
    pub fn new(ios_root: &Path, android_root: &Path, pipeline: Pipeline, options: SyncOptions) -> Self {
        Self {
            ios_root: ios_root.to_path_buf(),
            android_root: android_root.to_path_buf(),
            pipeline,
            options,
        }
    }

    /// Changes a run would consider, after `--files` and `--since`.
    ///
    /// Read-only. Returns the loaded state, the filtered change list and the
    /// sources that could not be read.
    ///
    /// # Errors
    ///
    /// Missing roots, missing baseline or a corrupt state file.
    pub fn pending(&self) -> Result<(SyncState, Vec<FileChange>, Vec<String>)> {
        check_roots(&self.ios_root, &self.android_root)?;
        let state = load_state(&self.android_root)?;

        let detection = detect_changes(&self.ios_root, &state, &self.options.excludes);
        let mut changes = detection.changes;
        debug!(count = changes.len(), "Detected changes");

        let patterns: Vec<&str> = self
            .options
            .files
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .collect();
        if !patterns.is_empty() {
            changes.retain(|c| patterns.iter().any(|p| c.source_path.contains(p)));
            debug!(count = changes.len(), "Filtered by --files");
        }

        if let Some(since) = &self.options.since {
            if let Some(touched) = git_changed_since(&self.ios_root, since) {
                changes.retain(|c| touched.contains(&c.source_path));
                debug!(count = changes.len(), since = %since, "Filtered by --since");
            }
        }

        Ok((state, changes, detection.unreadable))
    }

    /// Run one sync.
    ///
    /// Every change is reviewed before any of them is applied. An abort
    /// therefore leaves the Android tree, the merge bases and the state
    /// exactly as they were; the returned report has `aborted` set and no
    /// records. With no surviving changes nothing is written at all, not
    /// even the state timestamp.
    ///
    /// # Errors
    ///
    /// Everything [`Synchronizer::pending`] fails on, a reviewer failure,
    /// or an error persisting the state. Per-file failures are reported in
    /// the [`SyncReport`].
    pub fn run(&self, reviewer: &mut dyn Reviewer) -> Result<SyncReport> {
        let (state, changes, unreadable) = self.pending()?;

        let mut report = SyncReport {
            since_sync: state.last_sync_date.clone(),
            detected: ChangeCounts::of(&changes),
            unreadable,
            dry_run: self.options.dry_run,
            ..SyncReport::default()
        };

        if changes.is_empty() {
            info!("No changes detected");
            return Ok(report);
        }

        let mut decisions = Vec::with_capacity(changes.len());
        for change in &changes {
            let decision = if self.options.dry_run {
                Decision::Accept
            } else {
                reviewer.review(change)?
            };
            if decision == Decision::Abort {
                warn!(path = %change.source_path, "Sync aborted; nothing applied");
                report.aborted = true;
                return Ok(report);
            }
            decisions.push(decision);
        }

        let applier = Applier::new(
            &self.ios_root,
            &self.android_root,
            &state.package_name,
            &self.pipeline,
        )
        .dry_run(self.options.dry_run);
        let mut bases = BaseStore::new(&self.android_root);
        let mut next = state.clone();

        for (change, decision) in changes.iter().zip(decisions) {
            let outcome = if decision == Decision::Accept {
                applier.apply(change, &bases)
            } else {
                info!(path = %change.source_path, "Rejected");
                Outcome::Skipped(SkipReason::Rejected)
            };

            if let Outcome::Failed(e) = &outcome {
                warn!(path = %change.source_path, "{e}");
            }

            let mut record = ChangeRecord::new(change, &outcome);
            if change.kind == ChangeKind::Added {
                record.shared_with = shared_target(&next, change, &outcome);
            }

            record_outcome(&mut next, &mut bases, change, &outcome);
            report.outcomes.count(&outcome);
            report.records.push(record);
        }

        if self.options.dry_run {
            return Ok(report);
        }

        next.last_sync_date = chrono::Utc::now().to_rfc3339();
        next.ios_commit = current_git_revision(&self.ios_root);
        bases.commit();
        save_state(&self.android_root, &next)?;
        report.state_saved = true;
        info!(
            tracked = next.checksums.len(),
            mapped = next.file_mapping.len(),
            "State updated"
        );

        Ok(report)
    }
}

/// Another source whose mapping already points at the target a new source
/// just resolved to. Two sources with the same stem and role collide.
fn shared_target(next: &SyncState, change: &FileChange, outcome: &Outcome) -> Option<String> {
    let target = outcome.target()?;
    let other = next.other_source_for(target, &change.source_path)?;
    warn!(
        path = %change.source_path,
        other = %other,
        target = %target,
        "Target is already mapped to another source"
    );
    Some(other.to_string())
}

/// Fold one outcome into the next state and the staged merge bases.
fn record_outcome(next: &mut SyncState, bases: &mut BaseStore, change: &FileChange, outcome: &Outcome) {
    let src = change.source_path.as_str();
    match outcome {
        Outcome::Written {
            target, generated, ..
        }
        | Outcome::ConflictWritten { target, generated } => {
            if let Some(hash) = &change.new_hash {
                next.record(src, target, hash);
                bases.stage(src, generated.clone());
            }
        }
        Outcome::Deleted { .. } => {
            next.forget(src);
            bases.stage_removal(src);
        }
        Outcome::Skipped(SkipReason::Policy) => {
            if let Some(hash) = &change.new_hash {
                next.acknowledge(src, hash);
            }
        }
        Outcome::Skipped(SkipReason::Rejected | SkipReason::Unreadable) | Outcome::Failed(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::apply::{CONFLICT_INCOMING, CONFLICT_LOCAL};
    use crate::sync::file::state_path;
    use crate::sync::hash::hash_file;
    use crate::sync::review::{AcceptAll, ScriptedReviewer};
    use std::fs;
    use tempfile::TempDir;

    const PKG: &str = "com.example.app";
    const PROFILE_KT: &str = "app/src/main/java/com/example/app/model/Profile.kt";
    const ACCOUNT_KT: &str = "app/src/main/java/com/example/app/model/Account.kt";
    const HELPER_KT: &str = "app/src/main/java/com/example/app/util/OldHelper.kt";

    struct Projects {
        ios: TempDir,
        android: TempDir,
    }

    impl Projects {
        /// Both roots plus an empty baseline.
        fn new() -> Self {
            let projects = Self {
                ios: TempDir::new().unwrap(),
                android: TempDir::new().unwrap(),
            };
            let state = SyncState::new(
                projects.ios.path().display().to_string(),
                projects.android.path().display().to_string(),
                PKG.to_string(),
            );
            save_state(projects.android.path(), &state).unwrap();
            projects
        }

        fn write_ios(&self, rel: &str, content: &str) {
            let path = self.ios.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        fn android(&self, rel: &str) -> PathBuf {
            self.android.path().join(rel)
        }

        fn sync_with(&self, options: SyncOptions, reviewer: &mut dyn Reviewer) -> Result<SyncReport> {
            Synchronizer::new(
                self.ios.path(),
                self.android.path(),
                Pipeline::swift_to_kotlin(),
                options,
            )
            .run(reviewer)
        }

        fn sync(&self) -> SyncReport {
            self.sync_with(SyncOptions::default(), &mut AcceptAll).unwrap()
        }

        fn state(&self) -> SyncState {
            load_state(self.android.path()).unwrap()
        }
    }

    #[test]
    fn test_new_model_then_rerun_is_quiet() {
        let p = Projects::new();
        p.write_ios("Models/Profile.swift", "struct Profile: Codable {\n    let id: Int\n}\n");

        let report = p.sync();
        assert_eq!(report.detected.added, 1);
        assert_eq!(report.outcomes.written, 1);
        assert!(report.state_saved);
        assert!(p.android(PROFILE_KT).exists());

        let state = p.state();
        assert_eq!(state.target_for("Models/Profile.swift"), Some(PROFILE_KT));
        assert!(state.checksums.contains_key("Models/Profile.swift"));

        let before = fs::read_to_string(state_path(p.android.path())).unwrap();
        let rerun = p.sync();
        assert!(rerun.no_changes());
        assert!(!rerun.state_saved);
        assert_eq!(fs::read_to_string(state_path(p.android.path())).unwrap(), before);
    }

    #[test]
    fn test_edited_source_untouched_target_rewrites_silently() {
        let p = Projects::new();
        p.write_ios("Models/Profile.swift", "struct Profile {\n    let id: Int\n}\n");
        p.sync();

        p.write_ios("Models/Profile.swift", "struct Profile {\n    let id: Int\n    let name: String\n}\n");
        let report = p.sync();

        assert_eq!(report.detected.modified, 1);
        assert_eq!(report.outcomes.written, 1);
        assert_eq!(report.outcomes.conflicts, 0);
        let kt = fs::read_to_string(p.android(PROFILE_KT)).unwrap();
        assert!(kt.contains("val name: String"));
        assert!(!kt.contains(CONFLICT_LOCAL));
    }

    #[test]
    fn test_edited_source_hand_edited_target_conflicts() {
        let p = Projects::new();
        p.write_ios("Models/Profile.swift", "struct Profile {\n    let id: Int\n}\n");
        p.sync();

        let mut kt = fs::read_to_string(p.android(PROFILE_KT)).unwrap();
        kt.push_str("\nfun Profile.display() = id.toString()\n");
        fs::write(p.android(PROFILE_KT), &kt).unwrap();

        p.write_ios("Models/Profile.swift", "struct Profile {\n    let id: Int\n    let name: String\n}\n");
        let report = p.sync();

        assert_eq!(report.outcomes.conflicts, 1);
        assert_eq!(report.conflicts().count(), 1);
        let merged = fs::read_to_string(p.android(PROFILE_KT)).unwrap();
        assert_eq!(merged.matches(CONFLICT_LOCAL).count(), 1);
        assert_eq!(merged.matches(CONFLICT_INCOMING).count(), 1);
        assert!(merged.contains("fun Profile.display()"));
        assert!(merged.contains("val name: String"));

        // The conflict is recorded; the next run has nothing to do.
        assert!(p.sync().no_changes());
    }

    #[test]
    fn test_deleted_source_removes_target_and_entries() {
        let p = Projects::new();
        p.write_ios("Utils/OldHelper.swift", "func help() {}\n");
        p.sync();
        assert!(p.android(HELPER_KT).exists());

        fs::remove_file(p.ios.path().join("Utils/OldHelper.swift")).unwrap();
        let report = p.sync();

        assert_eq!(report.detected.deleted, 1);
        assert_eq!(report.outcomes.deleted, 1);
        assert!(!p.android(HELPER_KT).exists());
        let state = p.state();
        assert!(state.target_for("Utils/OldHelper.swift").is_none());
        assert!(!state.checksums.contains_key("Utils/OldHelper.swift"));
    }

    #[test]
    fn test_test_files_are_acknowledged_not_mapped() {
        let p = Projects::new();
        p.write_ios("AppTests/ProfileTests.swift", "func testProfile() {}\n");

        let report = p.sync();
        assert_eq!(report.outcomes.skipped, 1);
        let state = p.state();
        assert!(state.checksums.contains_key("AppTests/ProfileTests.swift"));
        assert!(state.file_mapping.is_empty());
        assert!(p.sync().no_changes());
    }

    #[test]
    fn test_files_filter_leaves_others_pending() {
        let p = Projects::new();
        p.write_ios("Models/Profile.swift", "struct Profile {}\n");
        p.write_ios("Models/Account.swift", "struct Account {}\n");

        let options = SyncOptions {
            files: vec!["Profile".to_string()],
            ..SyncOptions::default()
        };
        let report = p.sync_with(options, &mut AcceptAll).unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].source_path, "Models/Profile.swift");

        let next = p.sync();
        assert_eq!(next.records.len(), 1);
        assert_eq!(next.records[0].source_path, "Models/Account.swift");
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let p = Projects::new();
        p.write_ios("Models/Profile.swift", "struct Profile {}\n");
        let before = fs::read_to_string(state_path(p.android.path())).unwrap();

        let options = SyncOptions {
            dry_run: true,
            ..SyncOptions::default()
        };
        let report = p.sync_with(options, &mut AcceptAll).unwrap();

        assert_eq!(report.outcomes.written, 1);
        assert!(!report.state_saved);
        assert!(!p.android(PROFILE_KT).exists());
        assert_eq!(fs::read_to_string(state_path(p.android.path())).unwrap(), before);
    }

    #[test]
    fn test_rejected_changes_stay_pending_and_rejected_deletions_stay_tracked() {
        let p = Projects::new();
        p.write_ios("Utils/OldHelper.swift", "func help() {}\n");
        p.sync();
        fs::remove_file(p.ios.path().join("Utils/OldHelper.swift")).unwrap();
        p.write_ios("Models/Profile.swift", "struct Profile {}\n");

        // Change order: added Profile, then deleted OldHelper.
        let mut reviewer = ScriptedReviewer::new([Decision::Reject, Decision::Reject]);
        let report = p.sync_with(SyncOptions::default(), &mut reviewer).unwrap();
        assert_eq!(report.outcomes.skipped, 2);

        let state = p.state();
        assert!(state.target_for("Utils/OldHelper.swift").is_some());
        assert!(!state.checksums.contains_key("Models/Profile.swift"));
        assert!(p.android(HELPER_KT).exists());

        let pending = p.sync();
        let kinds: Vec<ChangeKind> = pending.records.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![ChangeKind::Added, ChangeKind::Deleted]);
    }

    #[test]
    fn test_abort_applies_nothing_and_reports() {
        let p = Projects::new();
        p.write_ios("Models/Account.swift", "struct Account {}\n");
        p.write_ios("Models/Profile.swift", "struct Profile {}\n");
        let before = fs::read_to_string(state_path(p.android.path())).unwrap();

        let mut reviewer = ScriptedReviewer::new([Decision::Accept, Decision::Abort]);
        let report = p.sync_with(SyncOptions::default(), &mut reviewer).unwrap();

        assert!(report.aborted);
        assert!(!report.state_saved);
        assert_eq!(report.detected.added, 2);
        assert!(report.records.is_empty());
        assert_eq!(report.outcomes.total(), 0);
        assert!(!p.android(ACCOUNT_KT).exists());
        assert_eq!(fs::read_to_string(state_path(p.android.path())).unwrap(), before);

        let report = p.sync();
        assert!(!report.aborted);
        assert_eq!(report.outcomes.written, 2);
        assert_eq!(report.outcomes.conflicts, 0);
    }

    #[test]
    fn test_abort_after_accepted_conflict_leaves_target_alone() {
        let p = Projects::new();
        p.write_ios("Models/Account.swift", "struct Account {\n    let id: Int\n}\n");
        p.write_ios("Models/Profile.swift", "struct Profile {\n    let id: Int\n}\n");
        p.sync();

        let edited = format!(
            "{}\nfun Account.label() = id.toString()\n",
            fs::read_to_string(p.android(ACCOUNT_KT)).unwrap()
        );
        fs::write(p.android(ACCOUNT_KT), &edited).unwrap();
        p.write_ios("Models/Account.swift", "struct Account {\n    let id: Int64\n}\n");
        p.write_ios("Models/Profile.swift", "struct Profile {\n    let id: Int64\n}\n");

        // Accept the conflicting Account change, then quit at Profile.
        let mut reviewer = ScriptedReviewer::new([Decision::Accept, Decision::Abort]);
        let report = p.sync_with(SyncOptions::default(), &mut reviewer).unwrap();
        assert!(report.aborted);
        assert_eq!(fs::read_to_string(p.android(ACCOUNT_KT)).unwrap(), edited);

        let report = p.sync();
        assert_eq!(report.outcomes.conflicts, 1);
        assert_eq!(report.outcomes.written, 1);
        let merged = fs::read_to_string(p.android(ACCOUNT_KT)).unwrap();
        assert_eq!(merged.matches(CONFLICT_LOCAL).count(), 1);
        assert_eq!(merged.matches(CONFLICT_INCOMING).count(), 1);
        assert!(merged.contains("fun Account.label()"));
    }

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = std::process::Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(["-c", "user.name=sdroid", "-c", "user.email=sdroid@example.com", "-c", "commit.gpgsign=false"])
            .args(args)
            .output()
            .unwrap();
        assert!(output.status.success(), "git {args:?}: {}", String::from_utf8_lossy(&output.stderr));
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    #[test]
    fn test_since_keeps_only_files_changed_after_revision() {
        if std::process::Command::new("git").arg("--version").output().is_err() {
            return;
        }
        let p = Projects::new();
        let ios = p.ios.path();
        p.write_ios("Models/Account.swift", "struct Account {}\n");
        p.write_ios("Models/Profile.swift", "struct Profile {}\n");
        git(ios, &["init", "-q"]);
        git(ios, &["add", "."]);
        git(ios, &["commit", "-q", "-m", "first"]);
        let first = git(ios, &["rev-parse", "HEAD"]);

        p.write_ios("Models/Profile.swift", "struct Profile {\n    let id: Int\n}\n");
        git(ios, &["commit", "-q", "-am", "second"]);

        let options = SyncOptions {
            since: Some(first),
            ..SyncOptions::default()
        };
        let report = p.sync_with(options, &mut AcceptAll).unwrap();
        assert_eq!(report.detected.added, 1);
        let sources: Vec<&str> = report.records.iter().map(|r| r.source_path.as_str()).collect();
        assert_eq!(sources, vec!["Models/Profile.swift"]);
        assert!(p.android(PROFILE_KT).exists());
        assert!(!p.android(ACCOUNT_KT).exists());

        // The filtered-out file stays pending.
        let report = p.sync();
        assert_eq!(report.detected.added, 1);
        assert_eq!(report.records[0].source_path, "Models/Account.swift");
    }

    #[test]
    fn test_new_source_colliding_with_mapped_target_is_flagged() {
        let p = Projects::new();
        p.write_ios("Billing/Models/Profile.swift", "struct Profile {\n    let plan: String\n}\n");
        p.write_ios("Social/Models/Profile.swift", "struct Profile {\n    let handle: String\n}\n");

        let report = p.sync();
        assert_eq!(report.records.len(), 2);
        let billing = &report.records[0];
        let social = &report.records[1];
        assert_eq!(billing.target.as_deref(), Some(PROFILE_KT));
        assert_eq!(social.target.as_deref(), Some(PROFILE_KT));
        assert_eq!(billing.shared_with, None);
        assert_eq!(social.shared_with.as_deref(), Some("Billing/Models/Profile.swift"));
        // The second source never overwrites the first one silently.
        assert_eq!(report.outcomes.conflicts, 1);
        let kt = fs::read_to_string(p.android(PROFILE_KT)).unwrap();
        assert!(kt.contains("val plan: String"));
        assert!(kt.contains("val handle: String"));
    }

    #[test]
    fn test_missing_baseline_and_roots() {
        let ios = TempDir::new().unwrap();
        let android = TempDir::new().unwrap();
        let sync = |i: &Path, a: &Path| {
            Synchronizer::new(i, a, Pipeline::swift_to_kotlin(), SyncOptions::default())
                .run(&mut AcceptAll)
        };

        assert!(matches!(
            sync(ios.path(), android.path()),
            Err(Error::NoBaseline { .. })
        ));
        assert!(matches!(
            sync(&ios.path().join("nope"), android.path()),
            Err(Error::SourceNotFound { .. })
        ));
        assert!(matches!(
            sync(ios.path(), &android.path().join("nope")),
            Err(Error::TargetNotFound { .. })
        ));
    }

    #[test]
    fn test_excluded_dirs_never_surface() {
        let p = Projects::new();
        p.write_ios("Pods/Alamofire/Session.swift", "class Session {}\n");
        p.write_ios("App/build/Generated.swift", "let x = 1\n");
        assert!(p.sync().no_changes());
    }

    #[test]
    fn test_checksums_match_hash_of_source() {
        let p = Projects::new();
        p.write_ios("Models/Profile.swift", "struct Profile {}\r\n");
        p.sync();
        let expected = hash_file(&p.ios.path().join("Models/Profile.swift")).unwrap();
        assert_eq!(p.state().checksums["Models/Profile.swift"], expected);
    }
}
