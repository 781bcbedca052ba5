//! `vinspect coverage` command - questionnaire onto-coverage check

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::DataContext;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::coverage::{CoverageReport, CoverageVerifier, ReferenceKind};
use crate::core::PartsCatalog;

#[derive(clap::Args, Debug)]
pub struct CoverageArgs {
    /// Device version to check (default: configured device, then the first enabled)
    #[arg(long, short = 'd')]
    pub device: Option<String>,

    /// Also fail when some process is never reached
    #[arg(long)]
    pub strict: bool,

    /// List every covered part, not just the gaps
    #[arg(long)]
    pub covered: bool,
}

pub fn run(args: CoverageArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = DataContext::load(global)?;
    let device = ctx.device(args.device.as_deref())?;
    let (catalog, questionnaire) = ctx.device_data(device)?;

    let report = CoverageVerifier::new(&catalog).verify(&questionnaire);
    let percent = report.part_coverage_percent(catalog.len());

    match global.format {
        OutputFormat::Json => {
            #[derive(serde::Serialize)]
            struct Output<'a> {
                device: &'a str,
                total_parts: usize,
                coverage_percent: f64,
                #[serde(flatten)]
                report: &'a CoverageReport,
            }
            let output = Output {
                device: &device.version,
                total_parts: catalog.len(),
                coverage_percent: percent,
                report: &report,
            };
            let json = serde_json::to_string_pretty(&output).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Id | OutputFormat::Csv => {
            // Just output the gaps
            for pn in &report.missing_parts {
                println!("{}", pn);
            }
        }
        OutputFormat::Auto | OutputFormat::Table => {
            print_report(&report, &catalog, &device.version, percent, &args, global);
        }
    }

    if !report.passed {
        return Err(miette::miette!(
            "Coverage check failed: {} part(s) unreached, {} unknown reference(s)",
            report.missing_parts.len(),
            report.unknown_references.len()
        ));
    }
    if args.strict && report.has_warnings() {
        return Err(miette::miette!(
            "Coverage check failed (strict): {} process(es) unreached",
            report.unused_processes.len()
        ));
    }
    Ok(())
}

fn print_report(
    report: &CoverageReport,
    catalog: &PartsCatalog,
    device: &str,
    percent: f64,
    args: &CoverageArgs,
    global: &GlobalOpts,
) {
    println!("{} {}", style("Questionnaire Coverage Report").bold(), style(device).cyan());
    println!("{}", style("═".repeat(60)).dim());
    println!();
    println!("Questions:            {}", style(report.questions).cyan());
    println!("Catalog parts:        {}", style(catalog.len()).cyan());
    println!(
        "Unreached parts:      {}",
        if report.missing_parts.is_empty() {
            style(report.missing_parts.len()).green()
        } else {
            style(report.missing_parts.len()).red()
        }
    );
    println!(
        "Unreached processes:  {}",
        if report.unused_processes.is_empty() {
            style(report.unused_processes.len()).green()
        } else {
            style(report.unused_processes.len()).yellow()
        }
    );
    println!();
    println!(
        "Coverage: {}",
        if percent >= 100.0 {
            style(format!("{:.1}%", percent)).green().bold()
        } else if percent >= 80.0 {
            style(format!("{:.1}%", percent)).yellow()
        } else {
            style(format!("{:.1}%", percent)).red()
        }
    );

    if !report.missing_parts.is_empty() {
        println!();
        println!("{}", style("Unreached Parts:").bold());
        println!("{}", style("─".repeat(60)).dim());
        for pn in &report.missing_parts {
            let name = catalog.get(pn).map(|n| n.part_name()).unwrap_or("");
            println!("  {} {} - {}", style("○").red(), style(pn).cyan(), name);
        }
    }

    if !report.unknown_references.is_empty() {
        println!();
        println!("{}", style("Unknown References:").bold());
        println!("{}", style("─".repeat(60)).dim());
        for reference in &report.unknown_references {
            let kind = match reference.kind {
                ReferenceKind::Part => "part",
                ReferenceKind::Process => "process",
            };
            println!(
                "  {} {}/{} names unknown {} {}",
                style("✗").red(),
                reference.level,
                reference.question,
                kind,
                style(&reference.id).yellow()
            );
        }
    }

    if !report.unused_processes.is_empty() {
        println!();
        println!("{}", style("Unreached Processes (warning):").bold());
        println!("{}", style("─".repeat(60)).dim());
        for process in &report.unused_processes {
            println!("  {} {}", style("!").yellow(), process);
        }
    }

    if args.covered && !global.quiet {
        println!();
        println!("{}", style("Reached Parts:").bold());
        println!("{}", style("─".repeat(60)).dim());
        for node in catalog.parts() {
            if report.missing_parts.contains(node.part_number()) {
                continue;
            }
            let how = if report.directly_named_parts.contains(node.part_number()) {
                "named"
            } else if report.covered_parts.contains(node.part_number()) {
                "collateral"
            } else {
                "included"
            };
            println!(
                "  {} {} - {} {}",
                style("●").green(),
                style(node.part_number()).cyan(),
                node.part_name(),
                style(format!("({})", how)).dim()
            );
        }
    }

    println!();
    if report.passed {
        println!("{} Every part is reachable", style("✓").green().bold());
    }
}
