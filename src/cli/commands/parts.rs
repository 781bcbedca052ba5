//! `vinspect parts` command - browse the parts catalog

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::DataContext;
use crate::cli::table::{ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::PartsCatalog;
use crate::entities::part::{Level, PartNode};

#[derive(Subcommand, Debug)]
pub enum PartsCommands {
    /// List catalog parts
    List(ListArgs),

    /// Show one part and its relations
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only parts at this level (custom, 1, 2, 3)
    #[arg(long, short = 'l')]
    pub level: Option<Level>,

    /// Device version whose catalog to list
    #[arg(long, short = 'd')]
    pub device: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Part number
    pub part_number: String,

    /// Device version whose catalog to use
    #[arg(long, short = 'd')]
    pub device: Option<String>,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("pn", "PART", 12),
    ColumnDef::new("name", "NAME", 36),
    ColumnDef::new("level", "LEVEL", 6),
    ColumnDef::new("includes", "INCLUDES", 20),
    ColumnDef::new("collateral", "COLLATERAL", 20),
    ColumnDef::new("processes", "PROCESSES", 30),
];

pub fn run(cmd: PartsCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PartsCommands::List(args) => run_list(args, global),
        PartsCommands::Show(args) => run_show(args, global),
    }
}

fn load_catalog(global: &GlobalOpts, device: Option<&str>) -> Result<PartsCatalog> {
    let ctx = DataContext::load(global)?;
    let device = ctx.device(device)?;
    Ok(ctx.data.catalog(&device.catalog)?)
}

fn join(set: &indexmap::IndexSet<String>) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}

fn part_row(node: &PartNode) -> TableRow {
    TableRow::new(node.part_number())
        .cell("pn", node.part_number())
        .cell("name", node.part_name())
        .cell("level", node.level().as_str())
        .cell("includes", join(node.included_parts()))
        .cell("collateral", join(node.collateral_parts()))
        .cell("processes", join(node.included_processes()))
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let catalog = load_catalog(global, args.device.as_deref())?;

    let rows: Vec<TableRow> = catalog
        .parts()
        .filter(|p| args.level.map_or(true, |level| p.level() == level))
        .map(part_row)
        .collect();

    let formatter = TableFormatter::new(COLUMNS, "part");
    if global.quiet {
        formatter.without_summary().output(rows, global.format)
    } else {
        formatter.output(rows, global.format)
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let catalog = load_catalog(global, args.device.as_deref())?;
    let node = catalog
        .get(&args.part_number)
        .ok_or_else(|| miette::miette!("No part found matching '{}'", args.part_number))?;

    match global.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(node).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Id => println!("{}", node.part_number()),
        OutputFormat::Csv => {
            TableFormatter::new(COLUMNS, "part").output([part_row(node)], OutputFormat::Csv)?;
        }
        OutputFormat::Auto | OutputFormat::Table => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("Part").bold(), style(node.part_number()).cyan());
            println!("{}: {}", style("Name").bold(), node.part_name());
            println!("{}: {}", style("Level").bold(), node.level());
            println!("{}", style("─".repeat(60)).dim());

            if node.depth() > 0 {
                let mut builder = Builder::default();
                builder.push_record(["Collateral", "Includes", "Processes"]);
                for level in node.levels() {
                    builder.push_record([
                        level.collateral.unwrap_or(""),
                        level.included_part.unwrap_or(""),
                        level.included_process.unwrap_or(""),
                    ]);
                }
                println!("{}", builder.build().with(Style::sharp()));
            } else {
                println!("{}", style("No relations").dim());
            }

            let referenced = catalog.referenced_by(node.part_number());
            if !referenced.is_empty() {
                println!();
                println!("{}", style("Referenced by:").bold());
                for (other, relation) in referenced {
                    println!(
                        "  {} {} ({})",
                        style(other.part_number()).cyan(),
                        other.part_name(),
                        relation
                    );
                }
            }
        }
    }

    Ok(())
}
