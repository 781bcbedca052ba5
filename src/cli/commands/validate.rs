//! `vinspect validate` command - check inspection data files

use console::style;
use miette::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cli::GlobalOpts;
use crate::core::{load_data, Config, LoadError, LoadedData};

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Files or directories to validate (default: the configured data file)
    #[arg()]
    pub paths: Vec<PathBuf>,

    /// Continue validation after first error
    #[arg(long)]
    pub keep_going: bool,

    /// Show summary only, don't show individual errors
    #[arg(long)]
    pub summary: bool,
}

/// Validation statistics
#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_passed: usize,
    files_failed: usize,
    catalogs_built: usize,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let files = if !args.paths.is_empty() {
        expand_paths(&args.paths)
    } else if let Some(path) = global.data.clone().or_else(|| Config::load().data_file) {
        vec![path]
    } else {
        Vec::new()
    };

    let mut stats = ValidationStats::default();

    if files.is_empty() {
        // Nothing configured: check the bundled sample
        stats.files_checked += 1;
        let outcome = LoadedData::sample().and_then(|data| check_data(&data, &mut stats));
        report_file(Path::new("(bundled sample)"), outcome, &args, &mut stats);
    } else {
        if !global.quiet {
            println!("{} Validating {} file(s)...\n", style("→").blue(), files.len());
        }
        for path in &files {
            stats.files_checked += 1;
            let outcome = load_data(path).and_then(|data| check_data(&data, &mut stats));
            let failed = !report_file(path, outcome, &args, &mut stats);
            if failed && !args.keep_going {
                break;
            }
        }
    }

    println!();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style("Validation Summary").bold());
    println!("{}", style("─".repeat(60)).dim());
    println!("  Files checked:  {}", style(stats.files_checked).cyan());
    println!("  Files passed:   {}", style(stats.files_passed).green());
    println!("  Files failed:   {}", style(stats.files_failed).red());
    println!("  Catalogs built: {}", style(stats.catalogs_built).cyan());
    println!();

    if stats.files_failed > 0 {
        if stats.files_failed == 1 {
            Err(miette::miette!("Validation failed: 1 file has errors"))
        } else {
            Err(miette::miette!(
                "Validation failed: {} files have errors",
                stats.files_failed
            ))
        }
    } else {
        println!("{} All files passed validation!", style("✓").green().bold());
        Ok(())
    }
}

/// Build every catalog and resolve every enabled device's references
fn check_data(data: &LoadedData, stats: &mut ValidationStats) -> Result<(), LoadError> {
    for key in data.raw.catalogs.keys() {
        data.catalog(key)?;
        stats.catalogs_built += 1;
    }
    for device in data.devices().iter().filter(|d| d.enabled) {
        if !data.raw.catalogs.contains_key(&device.catalog) {
            return Err(LoadError::MissingCatalog(device.catalog.clone()));
        }
        data.questionnaire(&device.questionnaire)?;
    }
    Ok(())
}

/// Print one file's outcome; returns whether it passed
fn report_file(
    path: &Path,
    outcome: Result<(), LoadError>,
    args: &ValidateArgs,
    stats: &mut ValidationStats,
) -> bool {
    match outcome {
        Ok(()) => {
            stats.files_passed += 1;
            if !args.summary {
                println!("{} {}", style("✓").green(), path.display());
            }
            true
        }
        Err(e) => {
            stats.files_failed += 1;
            if !args.summary {
                println!("{} {}", style("✗").red(), path.display());
                let report = miette::Report::new(e);
                println!("{:?}", report);
            }
            false
        }
    }
}

/// Expand directories into the JSON files beneath them
fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }

    files
}
