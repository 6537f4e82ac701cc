//! Command-line client runtime for the irssi varlink service.
//!
//! The module owns argument parsing, configuration bootstrapping, call
//! encoding, and reply rendering. It can be driven from the binary entrypoint
//! or from tests where configuration loading and IO streams are substituted.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use irssi_varlink_config::Config;
use irssi_varlink_types::Reply;

mod cli;
mod command;
mod config;
mod errors;
mod transport;

use cli::Cli;
use command::{Invocation, Rendering};
use config::split_config_arguments;
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::AppError;
use errors::is_service_not_running;
use transport::connect;

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

struct CliRunner<'a, W: Write, E: Write, L: ConfigLoader> {
    io: IoStreams<'a, W, E>,
    loader: &'a L,
}

impl<'a, W, E, L> CliRunner<'a, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    const fn new(io: IoStreams<'a, W, E>, loader: &'a L) -> Self {
        Self { io, loader }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);

        let result = Cli::try_parse_from(&split.command_arguments)
            .map_err(AppError::CliUsage)
            .and_then(|cli| Invocation::try_from(cli.command))
            .and_then(|invocation| {
                self.loader
                    .load(&split.config_arguments)
                    .map(|config| (invocation, config))
            })
            .and_then(|(invocation, config)| self.execute(&invocation, &config));

        match result {
            Ok(exit_code) => exit_code,
            Err(AppError::CliUsage(error)) if !error.use_stderr() => {
                // Help and version output.
                let _ = write!(self.io.stdout, "{}", error.render());
                ExitCode::SUCCESS
            }
            Err(error) => {
                let _ = writeln!(self.io.stderr, "{error}");
                if is_service_not_running(&error) {
                    let _ = writeln!(self.io.stderr, "is irssi-varlinkd running?");
                }
                ExitCode::FAILURE
            }
        }
    }

    /// Issues the call and prints replies until the conversation ends.
    ///
    /// A plain call reads exactly one reply. A streaming call keeps reading
    /// until a reply arrives without `continues` or the service closes the
    /// connection. Any error reply makes the exit status a failure.
    fn execute(&mut self, invocation: &Invocation, config: &Config) -> Result<ExitCode, AppError> {
        let mut connection = connect(config.socket_path())?;
        connection.send(&invocation.call)?;

        let mut received = 0_usize;
        let mut failed = false;
        while let Some(reply) = connection.next_reply()? {
            received += 1;
            failed |= reply.is_error();
            render(&mut *self.io.stdout, invocation.rendering, &reply)?;
            if !invocation.is_streaming() || !reply.continues {
                break;
            }
        }
        self.io.stdout.flush().map_err(AppError::WriteOutput)?;

        if received == 0 {
            return Err(AppError::MissingReply);
        }
        Ok(if failed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        })
    }
}

fn render<W>(stdout: &mut W, rendering: Rendering, reply: &Reply) -> Result<(), AppError>
where
    W: Write,
{
    if let (Rendering::Description, false, Some(text)) =
        (rendering, reply.is_error(), reply.description())
    {
        stdout
            .write_all(text.as_bytes())
            .map_err(AppError::WriteOutput)?;
        if !text.ends_with('\n') {
            stdout.write_all(b"\n").map_err(AppError::WriteOutput)?;
        }
        return Ok(());
    }

    serde_json::to_writer(&mut *stdout, reply)
        .map_err(|error| AppError::WriteOutput(error.into()))?;
    stdout.write_all(b"\n").map_err(AppError::WriteOutput)
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
#[must_use]
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(IoStreams::new(stdout, stderr), loader).run(args)
}
