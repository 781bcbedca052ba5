use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vinspect::cli::{Cli, Commands, GlobalOpts};
use vinspect::core::Config;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(&global)?;

    match cli.command {
        Commands::Inspect(args) => vinspect::cli::commands::inspect::run(args, &global),
        Commands::Trim(args) => vinspect::cli::commands::trim::run(args, &global),
        Commands::Coverage(args) => vinspect::cli::commands::coverage::run(args, &global),
        Commands::Validate(args) => vinspect::cli::commands::validate::run(args, &global),
        Commands::Parts(cmd) => vinspect::cli::commands::parts::run(cmd, &global),
        Commands::Devices(args) => vinspect::cli::commands::devices::run(args, &global),
        Commands::Completions(args) => vinspect::cli::commands::completions::run(args),
    }
}

/// Logs go to stderr so command output stays pipeable. `RUST_LOG` wins over `-v`.
fn init_logging(global: &GlobalOpts) -> Result<()> {
    let default_level = if global.verbose { "vinspect=debug" } else { "vinspect=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = match Config::load().log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .into_diagnostic()?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .init();
    Ok(())
}
