//! Configuration management.
//!
//! sdroid reads one optional user config file, `~/.sdroid/config.json`.
//! Its location can be overridden with `--config` or `SDROID_CONFIG`.
//!
//! ```json
//! {
//!   "exclude_dirs": ["Vendor"],
//!   "rules_path": "/path/to/rules.json",
//!   "default_min_sdk": 26,
//!   "default_target_sdk": 34,
//!   "default_di": "koin",
//!   "default_ui": "compose"
//! }
//! ```
//!
//! Every field is optional. Precedence everywhere: CLI flag > config file >
//! built-in default.
//!
//! This module also holds the git helpers used to stamp and filter syncs.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::scaffold::{DiFramework, UiToolkit};

/// Default `minSdk` for generated projects.
pub const DEFAULT_MIN_SDK: u32 = 24;
/// Default `targetSdk` / `compileSdk` for generated projects.
pub const DEFAULT_TARGET_SDK: u32 = 34;

/// User configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory names to skip in addition to the built-in list.
    #[serde(default)]
    pub exclude_dirs: Vec<String>,

    /// JSON rule table replacing the built-in Swift → Kotlin rules.
    #[serde(default)]
    pub rules_path: Option<PathBuf>,

    #[serde(default)]
    pub default_min_sdk: Option<u32>,

    #[serde(default)]
    pub default_target_sdk: Option<u32>,

    #[serde(default)]
    pub default_di: Option<DiFramework>,

    #[serde(default)]
    pub default_ui: Option<UiToolkit>,
}

impl Config {
    /// Resolve `minSdk`: flag > config > default.
    #[must_use]
    pub fn resolve_min_sdk(&self, flag: Option<u32>) -> u32 {
        flag.or(self.default_min_sdk).unwrap_or(DEFAULT_MIN_SDK)
    }

    /// Resolve `targetSdk`: flag > config > default.
    #[must_use]
    pub fn resolve_target_sdk(&self, flag: Option<u32>) -> u32 {
        flag.or(self.default_target_sdk).unwrap_or(DEFAULT_TARGET_SDK)
    }

    #[must_use]
    pub fn resolve_di(&self, flag: Option<DiFramework>) -> DiFramework {
        flag.or(self.default_di).unwrap_or_default()
    }

    #[must_use]
    pub fn resolve_ui(&self, flag: Option<UiToolkit>) -> UiToolkit {
        flag.or(self.default_ui).unwrap_or_default()
    }
}

/// Global sdroid directory (`~/.sdroid`).
#[must_use]
pub fn global_sdroid_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".sdroid"))
}

/// Resolve the config file path.
///
/// Priority:
/// 1. `explicit_path` (from `--config`, which clap also fills from `SDROID_CONFIG`)
/// 2. `~/.sdroid/config.json`
#[must_use]
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }
    global_sdroid_dir().map(|dir| dir.join("config.json"))
}

/// Load the user configuration.
///
/// A missing file yields the defaults. An explicitly named file that does not
/// exist is an error, since the user asked for it.
///
/// # Errors
///
/// Returns [`Error::Config`] if the file cannot be read or parsed.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config> {
    let Some(path) = resolve_config_path(explicit_path) else {
        debug!("No home directory; using default config");
        return Ok(Config::default());
    };

    if !path.exists() {
        if explicit_path.is_some() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

    let config: Config = serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {e}")))?;
    debug!(path = %path.display(), "Loaded config");
    Ok(config)
}

// ── Git ───────────────────────────────────────────────────────

/// Current commit of the repository at `root`.
///
/// Returns `None` if `root` is not in a git repository or git is missing.
#[must_use]
pub fn current_git_revision(root: &Path) -> Option<String> {
    Command::new("git")
        .arg("-C")
        .arg(root)
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|rev| !rev.is_empty())
}

/// Swift files under `root` that changed between `since` and `HEAD`.
///
/// Paths are relative to `root`. Returns `None` (after logging a warning) if
/// git is unavailable or the revision cannot be resolved; callers then apply
/// no filter.
#[must_use]
pub fn git_changed_since(root: &Path, since: &str) -> Option<BTreeSet<String>> {
    let output = Command::new("git")
        .arg("-C")
        .arg(root)
        .args(["diff", "--name-only", "--relative", since, "HEAD", "--", "*.swift"])
        .output();

    match output {
        Ok(out) if out.status.success() => Some(
            String::from_utf8_lossy(&out.stdout)
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        Ok(out) => {
            warn!(
                since,
                "git diff failed, ignoring --since: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            );
            None
        }
        Err(e) => {
            warn!(since, "git unavailable, ignoring --since: {e}");
            None
        }
    }
}
