//! Call decoding and validation.
//!
//! A frame becomes a [`Call`] in two steps. Decoding rejects bytes that are
//! not JSON with `Invalid JSON`. Validation then requires a `method` naming
//! at least two dot-separated segments, each starting with an ASCII letter
//! and otherwise made of ASCII letters, digits, or underscores. Optional
//! fields take their defaults: `parameters` is empty, `more` and `oneway`
//! are false.

use serde_json::{Map, Value};

use super::errors::VarlinkError;

/// A validated method call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    method: String,
    parameters: Map<String, Value>,
    more: bool,
    oneway: bool,
}

impl Call {
    /// Decodes and validates one frame.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` with `Invalid JSON` when the frame is not
    /// JSON, and the errors of [`Call::from_value`] otherwise.
    pub fn parse(frame: &[u8]) -> Result<Self, VarlinkError> {
        let value: Value =
            serde_json::from_slice(frame).map_err(|_| VarlinkError::invalid("Invalid JSON"))?;
        Self::from_value(value)
    }

    /// Validates a decoded JSON value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` with `Missing method` when there is no
    /// `method`, `Invalid method format` when it is not a well-formed
    /// method name, and `Invalid parameters` when `parameters` is present but
    /// not an object.
    pub fn from_value(value: Value) -> Result<Self, VarlinkError> {
        let Value::Object(mut object) = value else {
            return Err(VarlinkError::invalid("Missing method"));
        };

        let method = match object.remove("method") {
            None | Some(Value::Null) => return Err(VarlinkError::invalid("Missing method")),
            Some(Value::String(method)) if is_valid_method_name(&method) => method,
            Some(_) => {
                return Err(VarlinkError::invalid_parameter(
                    "method",
                    "Invalid method format",
                ));
            }
        };

        let parameters = match object.remove("parameters") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(parameters)) => parameters,
            Some(_) => {
                return Err(VarlinkError::invalid_parameter(
                    "parameters",
                    "Invalid parameters",
                ));
            }
        };

        Ok(Self {
            method,
            parameters,
            more: flag(&object, "more"),
            oneway: flag(&object, "oneway"),
        })
    }

    /// Fully qualified method name.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Call parameters.
    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    /// Returns a parameter by name, treating JSON `null` as absent.
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name).filter(|value| !value.is_null())
    }

    /// Returns a string parameter by name.
    pub fn string_parameter(&self, name: &str) -> Option<&str> {
        self.parameter(name).and_then(Value::as_str)
    }

    /// Whether the caller asked for a stream of replies.
    pub const fn more(&self) -> bool {
        self.more
    }

    /// Whether the caller declared it expects no reply. Accepted, not acted on.
    pub const fn oneway(&self) -> bool {
        self.oneway
    }
}

fn flag(object: &Map<String, Value>, name: &str) -> bool {
    object.get(name).and_then(Value::as_bool).unwrap_or(false)
}

/// Checks the dotted method name rule.
pub fn is_valid_method_name(method: &str) -> bool {
    let mut segments = 0_usize;
    for segment in method.split('.') {
        if !is_valid_segment(segment) {
            return false;
        }
        segments += 1;
    }
    segments >= 2
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars.next().is_some_and(|first| first.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
