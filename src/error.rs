//! Error types for the sdroid CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=configuration, 3=state, 4=abort, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for `--json` consumers
//!
//! Only run-level failures live here. Failures scoped to a single file during
//! a sync are [`crate::sync::ApplyError`]s and are reported per file.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sdroid operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Configuration (exit 2)
    SourceNotFound,
    TargetNotFound,
    NoBaseline,
    AlreadyInitialized,
    ConfigError,

    // State (exit 3)
    StateCorruption,

    // Abort (exit 4)
    UserAbort,

    // Validation (exit 5)
    InvalidArgument,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::SourceNotFound => "SOURCE_NOT_FOUND",
            Self::TargetNotFound => "TARGET_NOT_FOUND",
            Self::NoBaseline => "NO_BASELINE",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::StateCorruption => "STATE_CORRUPTION",
            Self::UserAbort => "USER_ABORT",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::SourceNotFound
            | Self::TargetNotFound
            | Self::NoBaseline
            | Self::AlreadyInitialized
            | Self::ConfigError => 2,
            Self::StateCorruption => 3,
            Self::UserAbort => 4,
            Self::InvalidArgument => 5,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether the whole run was refused before any file was touched.
    #[must_use]
    pub const fn is_pre_mutation(&self) -> bool {
        matches!(
            self,
            Self::SourceNotFound
                | Self::TargetNotFound
                | Self::NoBaseline
                | Self::AlreadyInitialized
                | Self::ConfigError
                | Self::StateCorruption
                | Self::InvalidArgument
                | Self::UserAbort
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that abort an sdroid command.
#[derive(Error, Debug)]
pub enum Error {
    #[error("iOS project not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Android project not found: {}", path.display())]
    TargetNotFound { path: PathBuf },

    #[error("No sync state found in {}", path.display())]
    NoBaseline { path: PathBuf },

    #[error("Sync state already exists at {}", path.display())]
    AlreadyInitialized { path: PathBuf },

    #[error("Sync state at {} is corrupt: {message}", path.display())]
    StateCorruption { path: PathBuf, message: String },

    #[error("Sync aborted by user")]
    UserAbort,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::SourceNotFound { .. } => ErrorCode::SourceNotFound,
            Self::TargetNotFound { .. } => ErrorCode::TargetNotFound,
            Self::NoBaseline { .. } => ErrorCode::NoBaseline,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::StateCorruption { .. } => ErrorCode::StateCorruption,
            Self::UserAbort => ErrorCode::UserAbort,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NoBaseline { .. } => Some(
                "Run `sdroid convert <ios> <android> --package <id>` first to create a baseline."
                    .to_string(),
            ),
            Self::AlreadyInitialized { path } => Some(format!(
                "{} already tracks this project. Use `sdroid sync` to update it, \
                 or `--force` to convert again from scratch.",
                path.display()
            )),
            Self::StateCorruption { path, .. } => Some(format!(
                "Restore {} from version control, or move it aside and run `sdroid convert --force`.",
                path.display()
            )),
            Self::UserAbort => Some(
                "Every change was reviewed before any was applied, so nothing \
                 was written. The same changes are detected again on the next sync."
                    .to_string(),
            ),
            Self::SourceNotFound { .. }
            | Self::TargetNotFound { .. }
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "exit_code": code.exit_code(),
                "pre_mutation": code.is_pre_mutation(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
