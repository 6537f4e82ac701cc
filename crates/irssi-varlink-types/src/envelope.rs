//! Request and reply envelopes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const fn is_false(value: &bool) -> bool {
    !*value
}

/// A method call as sent by a client.
///
/// `more` and `oneway` are only serialised when set, matching what a
/// hand-written client would send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    /// Fully qualified method name, for example `org.varlink.service.GetInfo`.
    pub method: String,
    /// Named call parameters.
    #[serde(default)]
    pub parameters: Map<String, Value>,
    /// Requests a stream of replies instead of a single one.
    #[serde(default, skip_serializing_if = "is_false")]
    pub more: bool,
    /// Signals that the caller does not expect a reply.
    #[serde(default, skip_serializing_if = "is_false")]
    pub oneway: bool,
}

impl CallRequest {
    /// Creates a call with no parameters.
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            parameters: Map::new(),
            more: false,
            oneway: false,
        }
    }

    /// Replaces the call parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Adds a single named parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Sets the `more` flag.
    #[must_use]
    pub const fn streaming(mut self, more: bool) -> Self {
        self.more = more;
        self
    }
}

/// A reply written by the service.
///
/// Successful replies carry only `parameters`. Error replies also carry the
/// error name in `error` and a human-readable `description` inside
/// `parameters`. Replies to streaming subscribers carry `continues: true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// Error name, present only on error replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Reply payload.
    #[serde(default)]
    pub parameters: Map<String, Value>,
    /// Marks one reply in an open-ended sequence.
    #[serde(default, skip_serializing_if = "is_false")]
    pub continues: bool,
}

impl Reply {
    /// Builds a success reply.
    #[must_use]
    pub const fn success(parameters: Map<String, Value>) -> Self {
        Self {
            error: None,
            parameters,
            continues: false,
        }
    }

    /// Builds an error reply.
    #[must_use]
    pub fn failure(error: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            error: Some(error.into()),
            parameters,
            continues: false,
        }
    }

    /// Sets the `continues` marker.
    #[must_use]
    pub const fn continuing(mut self, continues: bool) -> Self {
        self.continues = continues;
        self
    }

    /// Returns true for error replies.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Returns the error reply's description, when present.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.parameters.get("description").and_then(Value::as_str)
    }
}
