//! Varlink bridge between irssi and local clients.
//!
//! The crate serves the `org.irssi.varlink` interface on a UNIX domain
//! socket. Requests and replies are JSON documents each followed by a NUL
//! byte. Clients query service metadata, send messages through a server
//! connection, look up nicks, and subscribe to IRC events with
//! `WaitForEvent`, either for the next event or, with `more`, for every
//! event until they disconnect.
//!
//! [`Service`] is the protocol engine. It runs a single-threaded readiness
//! loop that owns the listener and every session, so no session state is
//! shared between threads. Hosts hand in events through an [`EventSender`]
//! (or [`Service::publish`] from the loop thread) and expose their server
//! connections by implementing [`ServerRegistry`]. Stopping the service
//! sends every client a `ServiceShutdown` error, half-closes each
//! connection, and removes the socket file.
//!
//! The `irssi-varlinkd` binary hosts the service over the servers declared
//! in its configuration and stops on SIGINT, SIGTERM, SIGHUP, or SIGQUIT.

mod broadcast;
mod dispatch;
mod event;
mod health;
mod host;
mod interface;
mod process;
mod reactor;
mod service;
pub mod telemetry;
mod transport;

pub use broadcast::DeliveryReport;
pub use dispatch::{Call, VarlinkError, is_valid_method_name};
pub use event::{Event, MessageEvent, MessageKind, unix_timestamp};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use host::{OutgoingMessage, Outbox, ServerConnection, ServerRegistry, StaticServerRegistry};
pub use interface::{INTERFACE_DESCRIPTION, INTERFACES, PRODUCT, URL, VENDOR, VERSION};
pub use process::{
    ConfigLoader, LaunchError, StaticConfigLoader, SystemConfigLoader, run_daemon, run_daemon_with,
};
pub use reactor::{EventSender, PollReadiness, ReactorError, Readiness, ServiceStopped, Token};
pub use service::{Service, ServiceError, Turn};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{ListenerError, SessionId, SessionWriteError, WaitMode};

#[cfg(test)]
mod tests;
