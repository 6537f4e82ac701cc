//! Socket transport: the listener and the sessions it accepts.

mod errors;
mod listener;
mod session;

pub use self::errors::{ListenerError, SessionWriteError};
pub(crate) use self::listener::SocketListener;
pub(crate) use self::session::{ReadOutcome, SessionRegistry};
pub use self::session::{SessionId, WaitMode};

pub(crate) const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
