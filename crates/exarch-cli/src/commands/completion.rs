//! Shell completion generation command.

use crate::cli::Cli;
use crate::cli::CompletionArgs;
use clap::CommandFactory;
use std::io;

/// Generates shell completions for the requested shell.
pub fn execute(args: &CompletionArgs) {
    let mut cmd = Cli::command();
    clap_complete::generate(args.shell, &mut cmd, "exarch", &mut io::stdout());
}
