//! Readiness notification for the service loop.
//!
//! The loop registers every descriptor it owns under a [`Token`] and asks
//! the [`Readiness`] implementation which of them can be read without
//! blocking. Tokens come back in a stable order so each iteration handles
//! sources deterministically.

mod inbox;
mod poll;

use std::os::fd::RawFd;
use std::time::Duration;

use thiserror::Error;

use crate::transport::SessionId;

pub use self::inbox::{EventSender, ServiceStopped};
pub(crate) use self::inbox::{Inbox, InboxMessage, inbox};
pub use self::poll::PollReadiness;

/// Identifies a registered readiness source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Token {
    /// The listening socket.
    Listener,
    /// Cross-thread event and stop requests.
    Inbox,
    /// Termination signals.
    Signals,
    /// An accepted client connection.
    Session(SessionId),
}

/// Registration interface over an OS readiness primitive.
pub trait Readiness {
    /// Starts watching `fd` for read readiness under `token`.
    ///
    /// Registering an existing token replaces its descriptor. The caller
    /// keeps `fd` open until it unregisters the token.
    fn register(&mut self, token: Token, fd: RawFd);

    /// Stops watching the descriptor registered under `token`.
    fn unregister(&mut self, token: Token);

    /// Blocks until at least one source is readable or `timeout` elapses.
    ///
    /// `None` waits indefinitely. An interrupted wait returns no tokens.
    ///
    /// # Errors
    ///
    /// Returns [`ReactorError::Poll`] when the OS primitive fails.
    fn wait(&mut self, timeout: Option<Duration>) -> Result<Vec<Token>, ReactorError>;
}

/// Errors raised by the readiness primitive.
#[derive(Debug, Error)]
pub enum ReactorError {
    /// Polling the registered descriptors failed.
    #[error("failed to poll readiness sources: {0}")]
    Poll(#[source] nix::Error),
}
