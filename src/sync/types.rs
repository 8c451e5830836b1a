//! Sync run options and reports.

use serde::Serialize;

use crate::model::{ChangeKind, FileChange};
use crate::sync::apply::{Outcome, WriteAction};
use crate::sync::detect::Excludes;

/// Options for one sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Report what would happen without touching the Android tree or state.
    pub dry_run: bool,
    /// Only changes whose source path contains one of these substrings.
    pub files: Vec<String>,
    /// Only changes git reports between this revision and `HEAD`.
    pub since: Option<String>,
    pub excludes: Excludes,
}

/// Detected changes by kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangeCounts {
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
}

impl ChangeCounts {
    /// Count a change list.
    #[must_use]
    pub fn of(changes: &[FileChange]) -> Self {
        let mut counts = Self::default();
        for change in changes {
            match change.kind {
                ChangeKind::Added => counts.added += 1,
                ChangeKind::Modified => counts.modified += 1,
                ChangeKind::Deleted => counts.deleted += 1,
            }
        }
        counts
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.added + self.modified + self.deleted
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Applied changes by outcome.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    /// Created or updated cleanly.
    pub written: usize,
    /// Already up to date; nothing written.
    pub unchanged: usize,
    pub conflicts: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl OutcomeCounts {
    pub fn count(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Written {
                action: WriteAction::Unchanged,
                ..
            } => self.unchanged += 1,
            Outcome::Written { .. } => self.written += 1,
            Outcome::ConflictWritten { .. } => self.conflicts += 1,
            Outcome::Deleted { .. } => self.deleted += 1,
            Outcome::Skipped(_) => self.skipped += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.written + self.unchanged + self.conflicts + self.deleted + self.skipped + self.failed
    }
}

/// One change and what happened to it.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeRecord {
    pub source_path: String,
    pub kind: ChangeKind,
    pub outcome: &'static str,
    pub target: Option<String>,
    pub detail: Option<String>,
    /// Advisory marker the rewrite surfaced, if any.
    pub marker: Option<String>,
    /// Another source already mapped to the same target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_with: Option<String>,
}

impl ChangeRecord {
    #[must_use]
    pub fn new(change: &FileChange, outcome: &Outcome) -> Self {
        let marker = match outcome {
            Outcome::Written { marker, .. } => marker.clone(),
            _ => None,
        };
        Self {
            source_path: change.source_path.clone(),
            kind: change.kind,
            outcome: outcome.label(),
            target: outcome.target().map(str::to_string),
            detail: outcome.detail(),
            marker,
            shared_with: None,
        }
    }
}

/// Result of one sync run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    /// `lastSyncDate` of the baseline the run started from.
    pub since_sync: String,
    pub detected: ChangeCounts,
    pub outcomes: OutcomeCounts,
    pub records: Vec<ChangeRecord>,
    /// Sources that could not be read during detection.
    pub unreadable: Vec<String>,
    pub dry_run: bool,
    /// Whether the sync state file was rewritten.
    pub state_saved: bool,
    /// The reviewer quit. Nothing was applied and `records` is empty.
    pub aborted: bool,
}

impl SyncReport {
    /// Nothing to do: no change survived detection and filtering.
    #[must_use]
    pub const fn no_changes(&self) -> bool {
        self.detected.is_empty()
    }

    /// Records whose target now holds conflict delimiters.
    pub fn conflicts(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter().filter(|r| r.outcome == "conflict")
    }
}
