//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, coverage::CoverageArgs, devices::DevicesArgs,
    inspect::InspectArgs, parts::PartsCommands, trim::TrimArgs, validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "vinspect")]
#[command(author, version, about = "Visual inspection parts and processes resolver")]
#[command(long_about = "Resolves the parts and processes a damaged infusion device needs from a \
parts catalog, and checks that inspection questionnaires reach every catalog entry.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Inspection data file (defaults to the configured file, then the bundled sample)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a visual inspection and produce a report
    Inspect(InspectArgs),

    /// Resolve the parts and processes a set of damaged parts needs
    Trim(TrimArgs),

    /// Check that a questionnaire reaches every catalog entry
    Coverage(CoverageArgs),

    /// Validate inspection data files
    Validate(ValidateArgs),

    /// Browse the parts catalog
    #[command(subcommand)]
    Parts(PartsCommands),

    /// List device profiles or find the one for a serial number
    Devices(DevicesArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output for the terminal
    #[default]
    Auto,
    /// Bordered tables
    Table,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Just IDs, one per line
    Id,
}
