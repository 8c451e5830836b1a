//! File operations for sync.
//!
//! - Atomic writes: write to a temp file beside the target, fsync, rename
//! - Loading and persisting the sync state file
//! - Lossy reading of Swift sources

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::convert::classify;
use crate::error::{Error, Result};
use crate::model::{STATE_FILE_NAME, SourceFile, SyncState};
use crate::sync::hash::content_hash;

/// Write content to a file atomically.
///
/// This function:
/// 1. Writes content to a uniquely named temp file in the same directory
/// 2. Calls `fsync` to ensure data is on disk
/// 3. Atomically renames the temp file to the target path
///
/// If any step fails, the original file (if any) remains untouched and the
/// temp file is removed.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let file_name = path
        .file_name()
        .map_or_else(|| "file".into(), |n| n.to_string_lossy());
    let temp_path = parent.join(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4().simple()));

    let written = (|| {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        // Sync to disk before rename
        writer.get_ref().sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}

/// Read, hash and classify one Swift source in a single read.
///
/// Invalid UTF-8 is replaced, not rejected; the hash covers the raw bytes.
///
/// # Errors
///
/// Returns the I/O error if the file cannot be read.
pub fn load_source(ios_root: &Path, relative_path: &str) -> io::Result<SourceFile> {
    let bytes = fs::read(ios_root.join(relative_path))?;
    let raw_content = String::from_utf8_lossy(&bytes).into_owned();
    Ok(SourceFile {
        role: classify(relative_path, &raw_content),
        content_hash: content_hash(&bytes),
        relative_path: relative_path.to_string(),
        raw_content,
    })
}

/// Path of the sync state file inside an Android project.
#[must_use]
pub fn state_path(android_root: &Path) -> PathBuf {
    android_root.join(STATE_FILE_NAME)
}

/// Load the sync state of an Android project.
///
/// # Errors
///
/// - [`Error::NoBaseline`] if the project has no state file
/// - [`Error::StateCorruption`] if it cannot be parsed, or maps a file it
///   does not checksum
pub fn load_state(android_root: &Path) -> Result<SyncState> {
    let path = state_path(android_root);
    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::NoBaseline {
                path: android_root.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let state: SyncState =
        serde_json::from_str(&content).map_err(|e| Error::StateCorruption {
            path: path.clone(),
            message: e.to_string(),
        })?;

    let untracked = state.untracked_mappings();
    if !untracked.is_empty() {
        return Err(Error::StateCorruption {
            path,
            message: format!("mapped files without a checksum: {}", untracked.join(", ")),
        });
    }

    Ok(state)
}

/// Persist the sync state with a single atomic replace.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save_state(android_root: &Path, state: &SyncState) -> Result<()> {
    let mut json = serde_json::to_string_pretty(state)?;
    json.push('\n');
    atomic_write(&state_path(android_root), &json)?;
    Ok(())
}
