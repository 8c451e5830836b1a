//! Sync command implementation.

use std::path::Path;

use colored::Colorize;
use tracing::info;

use crate::cli::SyncArgs;
use crate::error::{Error, Result};
use crate::sync::{AcceptAll, PromptReviewer, Reviewer, SyncOptions, print_report};

/// Execute the sync command.
///
/// # Errors
///
/// Run-level failures only: missing roots or baseline, corrupt state, a bad
/// config, failing to persist the state, or [`Error::UserAbort`] after the
/// aborted report has been printed. Per-file failures are part of the report.
pub fn execute(args: &SyncArgs, config_path: Option<&Path>, json: bool) -> Result<()> {
    let options = SyncOptions {
        dry_run: args.dry_run,
        files: args.files.clone(),
        since: args.since.clone(),
        ..SyncOptions::default()
    };
    let sync = super::synchronizer(&args.project, config_path, options)?;

    let mut reviewer: Box<dyn Reviewer> = if args.interactive && !args.dry_run {
        Box::new(PromptReviewer::default())
    } else {
        Box::new(AcceptAll)
    };

    if !json {
        println!("{}", "Syncing iOS changes to Android".bold().underline());
        println!("  iOS:     {}", args.project.ios.display());
        println!("  Android: {}", args.project.android.display());
        println!();
    }

    let report = sync.run(reviewer.as_mut())?;
    info!(
        detected = report.detected.total(),
        conflicts = report.outcomes.conflicts,
        failed = report.outcomes.failed,
        "Sync finished"
    );

    if json {
        let output = serde_json::json!({
            "success": report.outcomes.failed == 0 && !report.aborted,
            "dry_run": report.dry_run,
            "aborted": report.aborted,
            "state_saved": report.state_saved,
            "since_sync": report.since_sync,
            "detected": report.detected,
            "outcomes": report.outcomes,
            "changes": report.records,
            "unreadable": report.unreadable,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        print_report(&report);
    }

    if report.aborted {
        return Err(Error::UserAbort);
    }
    Ok(())
}
