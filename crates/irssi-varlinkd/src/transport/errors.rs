//! Error types for socket listener and session operations.

use std::io;

use irssi_varlink_types::FrameError;
use thiserror::Error;

/// Errors surfaced while binding the socket listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to bind unix listener at {path}: {source}")]
    BindUnix {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("existing unix socket {path} is already in use")]
    UnixInUse { path: String },
    #[error("failed to read metadata for unix socket {path}: {source}")]
    UnixMetadata {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to connect to existing unix socket {path}: {source}")]
    UnixConnect {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to remove stale unix socket {path}: {source}")]
    UnixCleanup {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to enable non-blocking listener: {source}")]
    NonBlocking {
        #[source]
        source: io::Error,
    },
}

/// Errors raised while writing a reply to a session.
#[derive(Debug, Error)]
pub enum SessionWriteError {
    #[error("failed to encode reply: {0}")]
    Encode(#[from] FrameError),
    #[error("failed to write reply: {0}")]
    Io(#[from] io::Error),
}

impl SessionWriteError {
    /// Returns true when the write failed because the peer hung up.
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            Self::Io(error) if matches!(
                error.kind(),
                io::ErrorKind::BrokenPipe
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::NotConnected
            )
        )
    }
}
