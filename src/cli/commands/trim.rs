//! `vinspect trim` command - resolve what a set of damaged parts requires

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::DataContext;
use crate::cli::table::{ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{PartsCatalog, Resolution, TrimEngine};

#[derive(clap::Args, Debug)]
pub struct TrimArgs {
    /// Damaged part numbers
    #[arg()]
    pub parts: Vec<String>,

    /// Processes the damage calls for
    #[arg(long = "process", short = 'p')]
    pub processes: Vec<String>,

    /// Device version whose catalog to use
    #[arg(long, short = 'd')]
    pub device: Option<String>,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 24),
    ColumnDef::new("kind", "KIND", 8),
    ColumnDef::new("name", "NAME", 40),
];

pub fn run(args: TrimArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = DataContext::load(global)?;
    let device = ctx.device(args.device.as_deref())?;
    let catalog = ctx.data.catalog(&device.catalog)?;

    let resolution = TrimEngine::new(&catalog).trim(&args.parts, &args.processes)?;

    match global.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&resolution).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Auto => print_resolution(&resolution, &catalog, global),
        format => {
            let rows = resolution_rows(&resolution, &catalog);
            TableFormatter::new(COLUMNS, "item")
                .without_summary()
                .output(rows, format)?;
        }
    }

    Ok(())
}

fn resolution_rows(resolution: &Resolution, catalog: &PartsCatalog) -> Vec<TableRow> {
    let parts = resolution.required_parts.iter().map(|pn| {
        let name = catalog.get(pn).map(|n| n.part_name()).unwrap_or("");
        TableRow::new(pn.as_str())
            .cell("id", pn.as_str())
            .cell("kind", "part")
            .cell("name", name)
    });
    let processes = resolution
        .required_processes
        .iter()
        .map(|p| TableRow::new(p.as_str()).cell("id", p.as_str()).cell("kind", "process"));
    parts.chain(processes).collect()
}

fn print_resolution(resolution: &Resolution, catalog: &PartsCatalog, global: &GlobalOpts) {
    if resolution.is_empty() {
        println!("{} Nothing required", style("✓").green());
        return;
    }

    println!(
        "{} ({})",
        style("Required parts").bold(),
        resolution.required_parts.len()
    );
    for pn in &resolution.required_parts {
        match catalog.get(pn) {
            Some(node) => println!(
                "  {}  {}  {}",
                style(pn).cyan(),
                node.part_name(),
                style(format!("[level {}]", node.level())).dim()
            ),
            None => println!("  {}", style(pn).cyan()),
        }
    }

    println!();
    println!(
        "{} ({})",
        style("Required processes").bold(),
        resolution.required_processes.len()
    );
    for process in &resolution.required_processes {
        println!("  {}", style(process).yellow());
    }

    if !global.quiet {
        println!();
        println!(
            "{} {} part(s) visited: {}",
            style("→").blue(),
            resolution.visited.len(),
            resolution
                .visited
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
}
