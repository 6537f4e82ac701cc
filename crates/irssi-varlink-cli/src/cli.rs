//! CLI argument definitions for the irssi varlink client.

use clap::{Parser, Subcommand};
use irssi_varlink_types::names::interfaces;

/// Command-line client for the irssi varlink service.
#[derive(Parser, Debug)]
#[command(
    name = "irssi-varlink",
    version,
    disable_help_subcommand = true,
    arg_required_else_help = true
)]
pub(crate) struct Cli {
    /// The call to issue.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Calls understood by the client.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Prints service metadata.
    Info,
    /// Prints the interface definition text.
    Describe {
        /// Interface to describe.
        #[arg(value_name = "INTERFACE", default_value = interfaces::IRSSI)]
        interface: String,
    },
    /// Issues an arbitrary method call.
    Call {
        /// Fully qualified method name.
        #[arg(value_name = "METHOD")]
        method: String,
        /// Call parameters as a JSON object.
        #[arg(value_name = "PARAMETERS_JSON")]
        parameters: Option<String>,
        /// Requests a reply stream and prints every reply.
        #[arg(long)]
        more: bool,
    },
    /// Waits for the next chat message.
    Wait {
        /// Keeps printing messages until the service stops.
        #[arg(long)]
        follow: bool,
    },
    /// Sends a chat message through a connected server.
    Send {
        /// Server tag, for example `libera`.
        #[arg(long, value_name = "TAG")]
        server: String,
        /// Channel or nick receiving the message.
        #[arg(long, value_name = "TARGET")]
        target: String,
        /// Message text.
        #[arg(value_name = "MESSAGE")]
        message: String,
    },
    /// Prints the nick used on a server.
    Nick {
        /// Server tag.
        #[arg(value_name = "SERVER")]
        server: String,
    },
    /// Asks the service to broadcast a synthetic message.
    TestEvent {
        /// Message text; the service picks one when omitted.
        #[arg(value_name = "MESSAGE")]
        message: Option<String>,
    },
}
