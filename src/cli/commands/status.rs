//! Status command implementation.

use std::path::Path;

use crate::cli::ProjectArgs;
use crate::error::Result;
use crate::sync::{SyncOptions, get_sync_status, print_status};

/// Execute the status command. Read-only.
///
/// # Errors
///
/// Missing roots, missing baseline, corrupt state or a bad config.
pub fn execute(project: &ProjectArgs, config_path: Option<&Path>, json: bool) -> Result<()> {
    let sync = super::synchronizer(project, config_path, SyncOptions::default())?;
    let status = get_sync_status(&sync)?;

    if json {
        println!("{}", serde_json::to_string(&status)?);
    } else {
        print_status(&status);
    }
    Ok(())
}
