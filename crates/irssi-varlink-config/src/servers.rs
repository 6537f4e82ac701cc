use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when parsing [`ServerDirective`] values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServerDirectiveParseError {
    /// The `=` separating tag and nick was missing.
    #[error("server directive '{0}' is missing the '=' separator")]
    MissingSeparator(String),
    /// The tag was empty.
    #[error("server directive '{0}' has an empty tag")]
    EmptyTag(String),
    /// The nick was empty.
    #[error("server directive '{0}' has an empty nick")]
    EmptyNick(String),
}

/// A server connection hosted by the standalone daemon, written `TAG=NICK`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServerDirective {
    /// Connection tag used by clients to address the server.
    pub tag: String,
    /// Nick reported for the connection.
    pub nick: String,
}

impl ServerDirective {
    /// Creates a new directive.
    #[must_use]
    pub fn new(tag: impl Into<String>, nick: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            nick: nick.into(),
        }
    }
}

impl fmt::Display for ServerDirective {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}={}", self.tag, self.nick)
    }
}

impl FromStr for ServerDirective {
    type Err = ServerDirectiveParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (tag, nick) = input
            .split_once('=')
            .ok_or_else(|| ServerDirectiveParseError::MissingSeparator(input.to_string()))?;
        let (tag, nick) = (tag.trim(), nick.trim());
        if tag.is_empty() {
            return Err(ServerDirectiveParseError::EmptyTag(input.to_string()));
        }
        if nick.is_empty() {
            return Err(ServerDirectiveParseError::EmptyNick(input.to_string()));
        }
        Ok(Self::new(tag, nick))
    }
}

/// Collapses directives sharing a tag in-place, keeping the last one.
///
/// Tags compare exactly; the result is ordered by tag.
pub fn deduplicate_servers(servers: &mut Vec<ServerDirective>) {
    let mut merged: BTreeMap<String, ServerDirective> = BTreeMap::new();
    for directive in servers.drain(..) {
        merged.insert(directive.tag.clone(), directive);
    }
    *servers = merged.into_values().collect();
}
