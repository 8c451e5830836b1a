//! sdroid - incremental iOS to Android source synchronization
//!
//! This crate provides the core functionality for the `sdroid` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (Role, SyncState, FileChange)
//! - [`convert`] - Classification, path resolution and Swift → Kotlin rewriting
//! - [`sync`] - Change detection, apply/merge and the sync run
//! - [`project`] - Initial conversion of an iOS project
//! - [`scaffold`] - Android project templates
//! - [`analyze`] - Source inventories for the initial conversion
//! - [`config`] - Configuration and git helpers
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod analyze;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod project;
pub mod scaffold;
pub mod sync;

pub use error::{Error, Result};
