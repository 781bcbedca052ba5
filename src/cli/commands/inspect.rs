//! `vinspect inspect` command - run a visual inspection
//!
//! Answers come from the technician at the terminal, or from `--answers`
//! for scripted runs. The finished report goes to stdout or `--output`.

use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::cli::helpers::DataContext;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::serial::{check_range, confirm_serial, parse_serial, SERIAL_REDUNDANCY};
use crate::core::{Finding, InspectionSession, Resolution, SerialError, SessionError};
use crate::entities::device::{Category, DeviceProfile};
use crate::entities::question::Question;
use crate::schema::template::{DEFAULT_OPENING, DEFAULT_STATEMENT};
use crate::schema::{ReportGenerator, ReportInput};

#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    /// Device version (default: picked from the serial number)
    #[arg(long, short = 'd')]
    pub device: Option<String>,

    /// Serial number (skips the interactive double entry)
    #[arg(long, short = 's')]
    pub serial: Option<String>,

    /// Inspection category
    #[arg(long, short = 'c')]
    pub category: Option<Category>,

    /// Scripted answers, comma separated: y, n, or b (back)
    #[arg(long, value_delimiter = ',')]
    pub answers: Option<Vec<String>>,

    /// Write the report to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// One response to a question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    Yes,
    No,
    Back,
}

impl std::str::FromStr for Reply {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "y" | "yes" => Ok(Reply::Yes),
            "n" | "no" => Ok(Reply::No),
            "b" | "back" => Ok(Reply::Back),
            other => Err(format!("Invalid answer: '{}'. Use y, n, or b", other)),
        }
    }
}

/// Where answers come from
trait AnswerSource {
    fn reply(&mut self, question: &Question, position: usize, total: usize) -> Result<Reply>;
}

/// Answers given on the command line
struct Scripted {
    replies: std::vec::IntoIter<Reply>,
}

impl Scripted {
    fn new(tokens: &[String]) -> Result<Self> {
        let replies = tokens
            .iter()
            .filter(|t| !t.trim().is_empty())
            .map(|t| t.parse::<Reply>().map_err(|e| miette::miette!("{}", e)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            replies: replies.into_iter(),
        })
    }
}

impl AnswerSource for Scripted {
    fn reply(&mut self, question: &Question, position: usize, total: usize) -> Result<Reply> {
        self.replies.next().ok_or_else(|| {
            miette::miette!(
                "Ran out of answers at question {}/{}: {}",
                position + 1,
                total,
                question.display_text()
            )
        })
    }
}

/// Answers from the technician
struct Prompted<'t> {
    theme: &'t ColorfulTheme,
}

impl AnswerSource for Prompted<'_> {
    fn reply(&mut self, question: &Question, position: usize, total: usize) -> Result<Reply> {
        let options = ["No", "Yes", "Back"];
        let prompt = format!(
            "[{}/{}] {}: {}",
            position + 1,
            total,
            question.level,
            question.display_text()
        );
        let selection = Select::with_theme(self.theme)
            .with_prompt(prompt)
            .items(&options)
            .default(0)
            .interact()
            .into_diagnostic()?;
        Ok(match selection {
            1 => Reply::Yes,
            2 => Reply::Back,
            _ => Reply::No,
        })
    }
}

/// Scripted answers when given, otherwise prompts sharing the session theme
fn answer_source<'t>(
    answers: Option<&[String]>,
    theme: &'t ColorfulTheme,
) -> Result<Box<dyn AnswerSource + 't>> {
    Ok(match answers {
        Some(tokens) => Box::new(Scripted::new(tokens)?),
        None => Box::new(Prompted { theme }),
    })
}

#[derive(Serialize)]
struct InspectionOutput<'a> {
    session: String,
    device: &'a str,
    serial: u64,
    category: Category,
    technician: &'a str,
    fingerprint: &'a str,
    findings: Vec<&'a Finding>,
    remaining: &'a Resolution,
    report: &'a str,
}

pub fn run(args: InspectArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = DataContext::load(global)?;
    let technician = ctx.config.technician();
    let theme = ColorfulTheme::default();

    let (device, serial) = identify_device(&ctx, &args, &theme)?;
    let (catalog, questionnaire) = ctx.device_data(device)?;

    let category = match args.category {
        Some(c) => c,
        None if args.answers.is_some() => Category::default(),
        None => {
            let options = [Category::Repair, Category::Recert, Category::Rental];
            let labels: Vec<String> = options.iter().map(ToString::to_string).collect();
            let selection = Select::with_theme(&theme)
                .with_prompt("Category")
                .items(&labels[..])
                .default(0)
                .interact()
                .into_diagnostic()?;
            options[selection]
        }
    };

    let mut session =
        InspectionSession::new(device.version.as_str(), serial, &catalog, &questionnaire)
            .with_category(category);

    let mut source = answer_source(args.answers.as_deref(), &theme)?;
    let interactive = args.answers.is_none();

    while let Some(question) = session.current() {
        match source.reply(question, session.position(), session.total())? {
            Reply::Back => match session.back() {
                Ok(_) => {}
                Err(SessionError::AtStart) if interactive => {
                    println!("{}", style("Already at the first question").dim());
                }
                Err(e) => return Err(e.into()),
            },
            Reply::No => {
                session.answer(false)?;
            }
            Reply::Yes => {
                let finding = session.answer(true)?;
                if interactive {
                    if let Some(f) = finding {
                        print_finding(f);
                    }
                }
            }
        }
    }

    let remaining = session.remaining()?;
    let statements = &ctx.data.raw.statements;
    let generator = ReportGenerator::new()?;
    let report = generator.render_report(&ReportInput {
        session: &session,
        catalog: &catalog,
        remaining: &remaining,
        opening: statements.opening.as_deref().unwrap_or(DEFAULT_OPENING),
        default_statement: statements.default.as_deref().unwrap_or(DEFAULT_STATEMENT),
        revision: ctx.data.revision(),
        technician: &technician,
        fingerprint: &ctx.data.fingerprint,
    })?;

    info!(
        session = %session.id(),
        findings = session.findings().count(),
        parts = remaining.required_parts.len(),
        processes = remaining.required_processes.len(),
        "inspection complete"
    );

    let text = match global.format {
        OutputFormat::Json => {
            let output = InspectionOutput {
                session: session.id().to_string(),
                device: session.device(),
                serial: session.serial(),
                category: session.category(),
                technician: &technician,
                fingerprint: &ctx.data.fingerprint,
                findings: session.findings().collect(),
                remaining: &remaining,
                report: &report,
            };
            serde_json::to_string_pretty(&output).into_diagnostic()?
        }
        _ => report,
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", text.trim_end())).into_diagnostic()?;
            if !global.quiet {
                println!(
                    "{} Report written to {}",
                    style("✓").green(),
                    style(path.display()).cyan()
                );
            }
        }
        None => println!("{}", text.trim_end()),
    }

    Ok(())
}

/// Settle the serial number and the device profile it belongs to
fn identify_device<'a>(
    ctx: &'a DataContext,
    args: &InspectArgs,
    theme: &ColorfulTheme,
) -> Result<(&'a DeviceProfile, u64)> {
    let entries: Vec<String> = match &args.serial {
        Some(serial) => vec![serial.clone()],
        None => {
            let mut entries = Vec::with_capacity(SERIAL_REDUNDANCY);
            for attempt in 1..=SERIAL_REDUNDANCY {
                let prompt = if attempt == 1 {
                    "Serial number".to_string()
                } else {
                    format!("Serial number (entry {} of {})", attempt, SERIAL_REDUNDANCY)
                };
                let entry: String = Input::with_theme(theme)
                    .with_prompt(prompt)
                    .interact_text()
                    .into_diagnostic()?;
                // Quit tokens surface as SerialError::Cancelled
                parse_serial(&entry)?;
                entries.push(entry);
            }
            entries
        }
    };

    let first = entries
        .first()
        .ok_or_else(|| SerialError::Invalid(String::new()))
        .and_then(|e| parse_serial(e))?;

    let device = match args.device.as_deref() {
        Some(version) => {
            let device = ctx.device(Some(version))?;
            check_range(first, device)?;
            device
        }
        None => ctx.data.device_for_serial(first)?,
    };

    let serial = confirm_serial(&entries, device)?;
    Ok((device, serial))
}

fn print_finding(finding: &Finding) {
    let parts: Vec<&str> = finding.parts.iter().map(String::as_str).collect();
    let processes: Vec<&str> = finding.processes.iter().map(String::as_str).collect();
    println!(
        "  {} parts: {}  processes: {}",
        style("→").blue(),
        if parts.is_empty() { "-".to_string() } else { parts.join(", ") },
        if processes.is_empty() { "-".to_string() } else { processes.join(", ") }
    );
}
