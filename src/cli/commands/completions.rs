//! `vinspect completions <SHELL>` prints a completion script to stdout,
//! e.g. `source <(vinspect completions bash)` in a shell profile.

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use miette::Result;
use std::io::{self, Write};

use crate::cli::Cli;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(args: CompletionsArgs) -> Result<()> {
    write_script(args.shell, &mut io::stdout());
    Ok(())
}

fn write_script(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin, out);
}
