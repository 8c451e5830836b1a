//! Incremental iOS → Android sync.
//!
//! - **Detect**: hash the iOS tree, diff against the recorded checksums
//! - **Apply**: rewrite each changed file, refusing to clobber hand edits
//! - **Review**: optional per-change confirmation
//! - **Commit**: one atomic write of the next sync state
//!
//! # Architecture
//!
//! The sync state (`.ios-android-sync.json` in the Android root) keys
//! everything by iOS-relative path:
//! 1. `checksums` says which sources have been seen and at what content
//! 2. `fileMapping` says where each converted source landed
//!
//! Hand edits on the Android side are found by comparing the target against
//! the text sdroid last generated for it (see [`base`]), never by hashing the
//! target.
//!
//! # Example
//!
//! ```ignore
//! use sdroid::convert::Pipeline;
//! use sdroid::sync::{AcceptAll, SyncOptions, Synchronizer};
//!
//! let sync = Synchronizer::new(ios, android, Pipeline::swift_to_kotlin(), SyncOptions::default());
//! let report = sync.run(&mut AcceptAll)?;
//! println!("{} conflicts", report.outcomes.conflicts);
//! ```

pub mod apply;
pub mod base;
pub mod detect;
pub mod engine;
mod file;
mod hash;
pub mod review;
mod status;
mod types;

pub use apply::{ApplyError, Applier, Outcome, SkipReason, WriteAction};
pub use base::BaseStore;
pub use detect::{Detection, Excludes, detect_changes, scan_swift_files};
pub use engine::{Synchronizer, check_roots};
pub use file::{atomic_write, load_source, load_state, save_state, state_path};
pub use hash::{content_hash, has_changed, hash_file};
pub use review::{AcceptAll, Decision, PromptReviewer, Reviewer};
pub use status::{SyncStatus, get_sync_status, print_report, print_status};
pub use types::{ChangeCounts, ChangeRecord, OutcomeCounts, SyncOptions, SyncReport};
