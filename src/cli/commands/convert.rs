//! Convert command implementation.

use std::path::Path;

use colored::Colorize;

use crate::analyze::{Inventory, JsonInventory, ScanInventory};
use crate::cli::ConvertArgs;
use crate::error::Result;
use crate::project::{ConvertReport, convert_project};
use crate::scaffold::{ProjectSettings, TemplateScaffolder};
use crate::sync::Excludes;

/// Execute the convert command.
///
/// # Errors
///
/// Missing iOS root, an existing state without `--force`, a bad config or
/// analysis report, or a failed write.
pub fn execute(args: &ConvertArgs, config_path: Option<&Path>, json: bool) -> Result<()> {
    let (config, pipeline) = super::load_pipeline(config_path)?;
    let settings = ProjectSettings::new(
        &args.package,
        config.resolve_min_sdk(args.min_sdk),
        config.resolve_target_sdk(args.target_sdk),
        config.resolve_ui(args.ui),
        config.resolve_di(args.di),
    );

    let inventory: Box<dyn Inventory> = match &args.analysis {
        Some(report) => Box::new(JsonInventory::new(report)),
        None => Box::new(ScanInventory::new(
            &args.project.ios,
            Excludes::with_extra(&config.exclude_dirs),
        )),
    };

    let report = convert_project(
        &args.project.ios,
        &args.project.android,
        &settings,
        args.force,
        &TemplateScaffolder,
        inventory.as_ref(),
        &pipeline,
    )?;

    if json {
        let output = serde_json::json!({
            "success": true,
            "android": args.project.android.display().to_string(),
            "min_sdk": settings.min_sdk,
            "target_sdk": settings.target_sdk,
            "ui": settings.ui,
            "di": settings.di,
            "report": report,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        print_report(&report, &settings, &args.project.android);
    }
    Ok(())
}

fn print_report(report: &ConvertReport, settings: &ProjectSettings, android: &Path) {
    println!("{}", "Android project created".bold().underline());
    println!();
    println!("  App:       {}", report.app_name);
    println!("  Package:   {}", report.package_name);
    println!("  SDK:       min {}, target {}", settings.min_sdk, settings.target_sdk);
    println!("  Location:  {}", android.display());
    if let Some(commit) = &report.ios_commit {
        println!("  iOS commit: {}", commit.dimmed());
    }
    println!();

    println!(
        "{} {} scaffold files, {} of {} sources converted",
        "Wrote".green(),
        report.scaffolded.len(),
        report.seeded.len(),
        report.inventoried
    );
    for file in &report.seeded {
        println!("  {} {}", "Converted:".green(), file.target);
        if let Some(marker) = &file.marker {
            println!("    {} {marker}", "TODO:".yellow());
        }
    }
    for (source, reason) in &report.skipped {
        println!("  {} {source} ({reason})", "Skipped:".dimmed());
    }
    println!();

    println!("{}", "Next steps:".bold());
    println!("  1. Open the project in Android Studio");
    println!("  2. Search for TODO: VERIFY comments");
    println!("  3. Run 'sdroid sync' after iOS changes");
}
