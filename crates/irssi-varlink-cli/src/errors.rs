//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;
use irssi_varlink_types::FrameError;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("call parameters are not valid JSON: {0}")]
    ParseParameters(serde_json::Error),
    #[error("call parameters must be a JSON object")]
    ParametersNotObject,
    #[error("failed to connect to the varlink service at {socket}: {source}")]
    Connect {
        socket: Utf8PathBuf,
        source: io::Error,
    },
    #[error("failed to encode call: {0}")]
    EncodeCall(FrameError),
    #[error("failed to send call to the service: {0}")]
    SendCall(io::Error),
    #[error("failed to read reply from the service: {0}")]
    ReadReply(io::Error),
    #[error("service sent an oversized reply: {0}")]
    OversizedReply(FrameError),
    #[error("failed to parse service reply: {0}")]
    ParseReply(serde_json::Error),
    #[error("service closed the connection in the middle of a reply")]
    TruncatedReply,
    #[error("service closed the connection without replying")]
    MissingReply,
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
}

/// Determines whether an error indicates the service is not running.
///
/// Returns true for connection-refused and socket-not-found errors, which
/// mean no process is listening on the configured socket.
pub(crate) fn is_service_not_running(error: &AppError) -> bool {
    match error {
        AppError::Connect { source, .. } => matches!(
            source.kind(),
            io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound
        ),
        _ => false,
    }
}
