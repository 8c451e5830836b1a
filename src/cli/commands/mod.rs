//! Command implementations.

pub mod completions;
pub mod convert;
pub mod status;
pub mod sync;
pub mod version;

use std::path::Path;

use crate::cli::ProjectArgs;
use crate::config::{Config, load_config};
use crate::convert::Pipeline;
use crate::error::Result;
use crate::sync::{Excludes, SyncOptions, Synchronizer};

/// Load the config and the rewrite pipeline it selects.
fn load_pipeline(config_path: Option<&Path>) -> Result<(Config, Pipeline)> {
    let config = load_config(config_path)?;
    let pipeline = Pipeline::load(config.rules_path.as_deref())?;
    Ok((config, pipeline))
}

/// Build a synchronizer for a project pair, honoring config excludes.
fn synchronizer(
    project: &ProjectArgs,
    config_path: Option<&Path>,
    mut options: SyncOptions,
) -> Result<Synchronizer> {
    let (config, pipeline) = load_pipeline(config_path)?;
    options.excludes = Excludes::with_extra(&config.exclude_dirs);
    Ok(Synchronizer::new(&project.ios, &project.android, pipeline, options))
}
