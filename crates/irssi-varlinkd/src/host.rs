//! Boundary to the host's server connections.
//!
//! The service never talks IRC itself. It resolves a connection by tag and
//! asks it for its nick or to send a message. An embedding host implements
//! [`ServerRegistry`] over its own connection list; the standalone daemon
//! uses [`StaticServerRegistry`].

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use irssi_varlink_config::ServerDirective;

const HOST_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::host");

/// Lookup of server connections by tag.
pub trait ServerRegistry {
    /// Returns the connection carrying `tag`.
    fn find_by_tag(&mut self, tag: &str) -> Option<&mut dyn ServerConnection>;
}

/// A connected server as seen by the service.
pub trait ServerConnection {
    /// Nick currently used on the connection.
    fn nick(&self) -> &str;

    /// Sends `message` to `target` (a channel or nick).
    fn send_message(&mut self, target: &str, message: &str);
}

/// A message handed to [`ServerConnection::send_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Tag of the sending connection.
    pub server: String,
    /// Channel or nick.
    pub target: String,
    /// Message text.
    pub message: String,
}

/// Shared log of messages sent through a [`StaticServerRegistry`].
pub type Outbox = Arc<Mutex<Vec<OutgoingMessage>>>;

/// In-memory connection hosted by [`StaticServerRegistry`].
#[derive(Debug)]
pub struct StaticServer {
    tag: String,
    nick: String,
    outbox: Outbox,
}

impl ServerConnection for StaticServer {
    fn nick(&self) -> &str {
        &self.nick
    }

    fn send_message(&mut self, target: &str, message: &str) {
        info!(
            target: HOST_TARGET,
            server = %self.tag,
            target_name = %target,
            bytes = message.len(),
            "sending message"
        );
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(OutgoingMessage {
                server: self.tag.clone(),
                target: target.to_owned(),
                message: message.to_owned(),
            });
    }
}

/// Registry of fixed, in-memory connections.
///
/// Sent messages are logged and appended to a shared [`Outbox`].
#[derive(Debug, Default)]
pub struct StaticServerRegistry {
    servers: BTreeMap<String, StaticServer>,
    outbox: Outbox,
}

impl StaticServerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from configured `TAG=NICK` directives.
    pub fn from_directives<'a, I>(directives: I) -> Self
    where
        I: IntoIterator<Item = &'a ServerDirective>,
    {
        let mut registry = Self::new();
        for directive in directives {
            registry.insert(directive.tag.clone(), directive.nick.clone());
        }
        registry
    }

    /// Adds or replaces a connection.
    pub fn insert(&mut self, tag: impl Into<String>, nick: impl Into<String>) {
        let tag = tag.into();
        let server = StaticServer {
            tag: tag.clone(),
            nick: nick.into(),
            outbox: Arc::clone(&self.outbox),
        };
        self.servers.insert(tag, server);
    }

    /// Handle to the messages sent so far.
    pub fn outbox(&self) -> Outbox {
        Arc::clone(&self.outbox)
    }

    /// Number of hosted connections.
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Returns true when no connection is hosted.
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

impl ServerRegistry for StaticServerRegistry {
    fn find_by_tag(&mut self, tag: &str) -> Option<&mut dyn ServerConnection> {
        self.servers
            .get_mut(tag)
            .map(|server| server as &mut dyn ServerConnection)
    }
}
