//! CLI entrypoint for the irssi varlink client.
//!
//! The binary delegates to [`irssi_varlink_cli::run`], which loads
//! configuration, parses the subcommand, issues one varlink call, and prints
//! the replies as JSON lines.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    irssi_varlink_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
