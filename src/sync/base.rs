//! Last-generated Kotlin text, per source file.
//!
//! A target that still equals what sdroid generated for it last time has not
//! been touched by a human and can be replaced silently. A target that
//! differs from it has been edited and gets conflict delimiters instead.
//!
//! Bases live under `<android>/.ios-android-sync.base/`, mirroring the iOS
//! relative paths with a `.kt` suffix. They are keyed by source path like
//! the sync state, and like the sync state they are only written when a run
//! commits.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::sync::file::atomic_write;

/// Directory name of the base store inside the Android project root.
pub const BASE_DIR_NAME: &str = ".ios-android-sync.base";

/// Read access to the base store plus a pending change set.
#[derive(Debug)]
pub struct BaseStore {
    root: PathBuf,
    pending: BTreeMap<String, Option<String>>,
}

impl BaseStore {
    /// Base store of an Android project.
    #[must_use]
    pub fn new(android_root: &Path) -> Self {
        Self {
            root: android_root.join(BASE_DIR_NAME),
            pending: BTreeMap::new(),
        }
    }

    fn path_for(&self, source_path: &str) -> PathBuf {
        self.root.join(format!("{source_path}.kt"))
    }

    /// The last committed generation for a source path.
    ///
    /// Missing or unreadable bases read as `None`, which makes any existing
    /// target count as hand-edited.
    #[must_use]
    pub fn get(&self, source_path: &str) -> Option<String> {
        fs::read_to_string(self.path_for(source_path)).ok()
    }

    /// Stage a new base.
    pub fn stage(&mut self, source_path: &str, generated: String) {
        self.pending.insert(source_path.to_string(), Some(generated));
    }

    /// Stage removal of a base.
    pub fn stage_removal(&mut self, source_path: &str) {
        self.pending.insert(source_path.to_string(), None);
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Write all staged changes.
    ///
    /// A base that fails to write is logged and dropped: the next sync of
    /// that file conflicts instead of overwriting, which loses nothing.
    pub fn commit(&mut self) {
        for (source_path, base) in std::mem::take(&mut self.pending) {
            let path = self.path_for(&source_path);
            let result = match base {
                Some(content) => atomic_write(&path, &content),
                None => match fs::remove_file(&path) {
                    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                    other => other,
                },
            };
            if let Err(e) = result {
                warn!(path = %source_path, "Failed to update merge base: {e}");
            }
        }
    }
}
