//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::scaffold::{DiFramework, UiToolkit};

pub mod commands;

/// sdroid - keep an Android port in step with its iOS original
#[derive(Parser, Debug)]
#[command(name = "sdroid", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.sdroid/config.json)
    #[arg(long, global = true, env = "SDROID_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scaffold an Android project and convert models and view models
    Convert(ConvertArgs),

    /// Apply iOS changes since the last sync to the Android project
    Sync(SyncArgs),

    /// Show the baseline and pending changes without touching anything
    Status(ProjectArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

/// The two project roots every command works on.
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// iOS project root
    pub ios: PathBuf,

    /// Android project root
    pub android: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Android package name (e.g. com.example.app)
    #[arg(long, short = 'p')]
    pub package: String,

    /// Minimum SDK level
    #[arg(long)]
    pub min_sdk: Option<u32>,

    /// Target SDK level
    #[arg(long)]
    pub target_sdk: Option<u32>,

    /// UI toolkit
    #[arg(long, value_enum)]
    pub ui: Option<UiToolkit>,

    /// Dependency injection framework
    #[arg(long, value_enum)]
    pub di: Option<DiFramework>,

    /// Analyzer report to take the file inventory from (default: scan the iOS tree)
    #[arg(long)]
    pub analysis: Option<PathBuf>,

    /// Convert again over an existing sync state and overwrite generated files
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Only consider files git reports as changed since this revision
    #[arg(long)]
    pub since: Option<String>,

    /// Only consider paths containing one of these (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub files: Vec<String>,

    /// Show what would be done without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Confirm each change before applying it
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

/// Supported shells for completions.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
