//! Sync status and report display.
//!
//! Status is read-only: it loads the baseline and runs detection, but never
//! writes to either tree.

use colored::Colorize;
use serde::Serialize;

use crate::error::Result;
use crate::model::{ChangeKind, FileChange};
use crate::sync::engine::Synchronizer;
use crate::sync::types::{ChangeCounts, ChangeRecord, SyncReport};

/// Baseline summary plus what the next sync would act on.
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    pub last_sync_date: String,
    pub ios_commit: Option<String>,
    pub package_name: String,
    /// Files with a checksum.
    pub tracked: usize,
    /// Files with a mapped Android target.
    pub mapped: usize,
    pub pending: ChangeCounts,
    pub pending_changes: Vec<FileChange>,
    pub unreadable: Vec<String>,
}

/// Get the current sync status.
///
/// # Errors
///
/// Missing roots, missing baseline or a corrupt state file.
pub fn get_sync_status(sync: &Synchronizer) -> Result<SyncStatus> {
    let (state, changes, unreadable) = sync.pending()?;
    Ok(SyncStatus {
        last_sync_date: state.last_sync_date,
        ios_commit: state.ios_commit,
        package_name: state.package_name,
        tracked: state.checksums.len(),
        mapped: state.file_mapping.len(),
        pending: ChangeCounts::of(&changes),
        pending_changes: changes,
        unreadable,
    })
}

fn kind_label(kind: ChangeKind) -> colored::ColoredString {
    match kind {
        ChangeKind::Added => "added".green(),
        ChangeKind::Modified => "modified".yellow(),
        ChangeKind::Deleted => "deleted".red(),
    }
}

/// Print sync status to stdout in a human-readable format.
pub fn print_status(status: &SyncStatus) {
    println!("{}", "Sync Status".bold().underline());
    println!();

    println!("{}", "Baseline:".blue().bold());
    println!("  Package:       {}", status.package_name);
    println!("  Last sync:     {}", status.last_sync_date);
    println!(
        "  iOS commit:    {}",
        status.ios_commit.as_deref().unwrap_or("-")
    );
    println!("  Tracked files: {}", status.tracked);
    println!("  Mapped files:  {}", status.mapped);
    println!();

    if status.pending.is_empty() {
        println!("{}", "No pending changes.".green());
    } else {
        println!("{}", "Pending Changes:".yellow().bold());
        for change in &status.pending_changes {
            println!("  {:<9} {}", kind_label(change.kind), change.source_path);
        }
        println!(
            "  {}: {} added, {} modified, {} deleted",
            "Total".bold(),
            status.pending.added,
            status.pending.modified,
            status.pending.deleted
        );
        println!();
        println!("{}", "Run 'sdroid sync' to apply them.".dimmed());
    }

    if !status.unreadable.is_empty() {
        println!();
        println!("{}", "Unreadable:".red().bold());
        for path in &status.unreadable {
            println!("  {path}");
        }
    }
}

fn print_record(record: &ChangeRecord, dry_run: bool) {
    let target = record.target.as_deref().unwrap_or(&record.source_path);
    let line = match (record.outcome, record.detail.as_deref()) {
        ("written", Some("unchanged")) => format!("  {} {target}", "Unchanged:".dimmed()),
        ("written", Some("created")) if dry_run => format!("  {} {target}", "Would create:".green()),
        ("written", _) if dry_run => format!("  {} {target}", "Would update:".green()),
        ("written", Some("created")) => format!("  {} {target}", "Created:".green()),
        ("written", _) => format!("  {} {target}", "Updated:".green()),
        ("conflict", _) if dry_run => format!("  {} {target}", "Would conflict:".yellow()),
        ("conflict", _) => format!("  {} {target}", "Conflict:".yellow().bold()),
        ("deleted", Some(detail)) => format!("  {} {target} ({detail})", "Deleted:".red()),
        ("deleted", None) if dry_run => format!("  {} {target}", "Would delete:".red()),
        ("deleted", None) => format!("  {} {target}", "Deleted:".red()),
        ("skipped", detail) => format!(
            "  {} {} ({})",
            "Skipped:".dimmed(),
            record.source_path,
            detail.unwrap_or("skipped")
        ),
        (_, detail) => format!(
            "  {} {} ({})",
            "Failed:".red().bold(),
            record.source_path,
            detail.unwrap_or("unknown error")
        ),
    };
    println!("{line}");

    if let Some(marker) = &record.marker {
        println!("    {} {marker}", "TODO:".yellow());
    }
    if let Some(other) = &record.shared_with {
        println!("    {} also mapped from {other}", "Warning:".yellow());
    }
}

/// Print a sync report to stdout in a human-readable format.
pub fn print_report(report: &SyncReport) {
    println!("{} {}", "Last sync:".bold(), report.since_sync);
    println!();

    if report.no_changes() {
        println!("{}", "No changes detected.".green());
        return;
    }

    let d = &report.detected;
    println!("Found {} changes:", d.total());
    println!("  Added:    {}", d.added);
    println!("  Modified: {}", d.modified);
    println!("  Deleted:  {}", d.deleted);
    println!();

    if report.aborted {
        println!("{}", "Sync aborted. Nothing was applied; state unchanged.".yellow().bold());
        return;
    }

    if report.dry_run {
        println!("{}", "Dry run - showing what would be done:".yellow().bold());
        println!();
    }

    for record in &report.records {
        print_record(record, report.dry_run);
    }
    println!();

    let o = &report.outcomes;
    println!("{}", "Summary:".bold());
    println!("  Written:    {}", o.written);
    println!("  Unchanged:  {}", o.unchanged);
    println!("  Conflicts:  {}", o.conflicts);
    println!("  Deleted:    {}", o.deleted);
    println!("  Skipped:    {}", o.skipped);
    if o.failed > 0 {
        println!("  {}     {}", "Failed:".red().bold(), o.failed);
    }
    println!();

    if report.state_saved {
        println!("{}", "Sync complete. State updated.".green());
        println!();
    }

    println!("{}", "Next steps:".bold());
    println!("  1. Review files with conflict markers");
    println!("  2. Search for TODO: VERIFY comments");
    println!("  3. Build and test the Android project");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Pipeline;
    use crate::model::SyncState;
    use crate::sync::file::save_state;
    use crate::sync::types::SyncOptions;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_status_reports_pending_without_writing() {
        let ios = TempDir::new().unwrap();
        let android = TempDir::new().unwrap();
        let mut state = SyncState::new("/ios".into(), "/android".into(), "com.example.app".into());
        state.record("Gone.swift", "app/Gone.kt", "h");
        save_state(android.path(), &state).unwrap();
        fs::write(ios.path().join("New.swift"), "struct New {}\n").unwrap();

        let sync = Synchronizer::new(
            ios.path(),
            android.path(),
            Pipeline::swift_to_kotlin(),
            SyncOptions::default(),
        );
        let status = get_sync_status(&sync).unwrap();

        assert_eq!(status.tracked, 1);
        assert_eq!(status.mapped, 1);
        assert_eq!(status.pending.added, 1);
        assert_eq!(status.pending.deleted, 1);
        assert_eq!(status.package_name, "com.example.app");

        // Nothing was written.
        let entries: Vec<_> = fs::read_dir(android.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
