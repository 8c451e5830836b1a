//! Per-run change records.

use serde::Serialize;

use super::Role;

/// Kind of change detected for one iOS file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

impl ChangeKind {
    /// Get the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected difference between the iOS tree and the sync state.
///
/// Produced by change detection for exactly one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    /// iOS-relative path, `/`-separated.
    pub source_path: String,
    /// Mapped Android-relative path, if the state already has one.
    pub target_path: Option<String>,
    pub kind: ChangeKind,
    pub old_hash: Option<String>,
    pub new_hash: Option<String>,
}

impl FileChange {
    #[must_use]
    pub fn added(source_path: String, new_hash: String) -> Self {
        Self {
            source_path,
            target_path: None,
            kind: ChangeKind::Added,
            old_hash: None,
            new_hash: Some(new_hash),
        }
    }

    #[must_use]
    pub fn modified(
        source_path: String,
        target_path: Option<String>,
        old_hash: String,
        new_hash: String,
    ) -> Self {
        Self {
            source_path,
            target_path,
            kind: ChangeKind::Modified,
            old_hash: Some(old_hash),
            new_hash: Some(new_hash),
        }
    }

    #[must_use]
    pub fn deleted(source_path: String, target_path: Option<String>, old_hash: String) -> Self {
        Self {
            source_path,
            target_path,
            kind: ChangeKind::Deleted,
            old_hash: Some(old_hash),
            new_hash: None,
        }
    }
}

/// A scanned iOS file. Never persisted; only its path and hash survive.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub relative_path: String,
    pub role: Role,
    pub raw_content: String,
    pub content_hash: String,
}
