//! Domain events delivered to waiting clients.

use serde::Serialize;
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// An IRC occurrence broadcast to waiting sessions.
///
/// Events are built, published, and dropped; nothing keeps them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    /// Event family, for example `message`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Variant within the family, for example `public`.
    pub subtype: String,
    /// Tag of the originating server connection.
    pub server: String,
    /// Channel or recipient the event concerns.
    pub target: String,
    /// Nick of the sender.
    pub nick: String,
    /// Sender's `user@host`, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Message text.
    pub message: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

impl Event {
    /// Maps a message notification into an event stamped with `timestamp`.
    ///
    /// Public messages target their channel; private messages target the
    /// sender's nick.
    pub fn from_message(message: MessageEvent, timestamp: i64) -> Self {
        let target = match message.kind {
            MessageKind::Public => message.target,
            MessageKind::Private => message.nick.clone(),
        };
        Self {
            kind: "message".into(),
            subtype: message.kind.as_str().into(),
            server: message.server,
            target,
            nick: message.nick,
            address: message.address,
            message: message.message,
            timestamp,
        }
    }

    /// Builds the synthetic event used to exercise the delivery path.
    pub fn test(message: impl Into<String>, timestamp: i64) -> Self {
        Self {
            kind: "message".into(),
            subtype: "test".into(),
            server: "test".into(),
            target: "#test".into(),
            nick: "tester".into(),
            address: Some("tester@localhost".into()),
            message: message.into(),
            timestamp,
        }
    }

    /// Reply parameters carrying the event: `{"event": {...}}`.
    pub fn to_parameters(&self) -> Map<String, Value> {
        let mut parameters = Map::new();
        // Serialising a struct of strings and integers cannot fail.
        let event = serde_json::to_value(self).unwrap_or(Value::Null);
        parameters.insert("event".into(), event);
        parameters
    }
}

/// Current time in whole seconds since the Unix epoch.
pub fn unix_timestamp() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Kind of message notification raised by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// A message to a channel.
    Public,
    /// A direct message to the local user.
    Private,
}

impl MessageKind {
    /// Returns the event subtype for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

/// A message notification as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    /// Public or private.
    pub kind: MessageKind,
    /// Tag of the server connection.
    pub server: String,
    /// Message text.
    pub message: String,
    /// Sender's nick.
    pub nick: String,
    /// Sender's `user@host`, when known.
    pub address: Option<String>,
    /// Channel for public messages; the local nick for private ones.
    pub target: String,
}
