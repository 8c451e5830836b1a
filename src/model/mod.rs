//! Data models for sdroid.
//!
//! This module contains the domain models shared by conversion and sync:
//! - Role (architectural category of a Swift file)
//! - SyncState (the persisted baseline)
//! - FileChange / SourceFile (per-run records)

pub mod change;
pub mod role;
pub mod state;

pub use change::{ChangeKind, FileChange, SourceFile};
pub use role::Role;
pub use state::{STATE_FILE_NAME, SyncState};
