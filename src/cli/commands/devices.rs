//! `vinspect devices` command - device profiles and serial lookup

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::DataContext;
use crate::cli::table::{ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::serial::parse_serial;

#[derive(clap::Args, Debug)]
pub struct DevicesArgs {
    /// Report which device a serial number belongs to
    #[arg(long, value_name = "SERIAL")]
    pub check: Option<String>,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("version", "VERSION", 10),
    ColumnDef::new("ranges", "SERIAL RANGES", 40),
    ColumnDef::new("catalog", "CATALOG", 10),
    ColumnDef::new("questionnaire", "QUESTIONNAIRE", 14),
    ColumnDef::new("enabled", "ENABLED", 8),
];

pub fn run(args: DevicesArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = DataContext::load(global)?;

    if let Some(entry) = args.check {
        let serial = parse_serial(&entry)?;
        let device = ctx.data.device_for_serial(serial)?;
        match global.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(device).into_diagnostic()?;
                println!("{}", json);
            }
            OutputFormat::Id | OutputFormat::Csv => println!("{}", device.version),
            OutputFormat::Auto | OutputFormat::Table => println!(
                "{} SN {} is a {} ({})",
                style("✓").green(),
                style(serial).cyan(),
                style(&device.version).bold(),
                device.ranges_display()
            ),
        }
        return Ok(());
    }

    if global.format == OutputFormat::Json {
        let json = serde_json::to_string_pretty(ctx.data.devices()).into_diagnostic()?;
        println!("{}", json);
        return Ok(());
    }

    let rows = ctx.data.devices().iter().map(|d| {
        TableRow::new(d.version.as_str())
            .cell("version", d.version.as_str())
            .cell("ranges", d.ranges_display())
            .cell("catalog", d.catalog.as_str())
            .cell("questionnaire", d.questionnaire.as_str())
            .cell("enabled", if d.enabled { "yes" } else { "no" })
    });
    let formatter = TableFormatter::new(COLUMNS, "device");
    if global.quiet {
        formatter.without_summary().output(rows, global.format)
    } else {
        formatter.output(rows, global.format)
    }
}
