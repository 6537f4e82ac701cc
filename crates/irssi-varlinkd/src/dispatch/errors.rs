//! Protocol errors reported to callers.
//!
//! Every variant maps to one error name from the varlink catalogue and
//! carries the structured fields that go into the reply's `parameters`
//! alongside the human-readable `description`.

use irssi_varlink_types::Reply;
use irssi_varlink_types::names::errors;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors turned into error replies by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VarlinkError {
    /// The call or one of its parameters is malformed.
    #[error("{description}")]
    InvalidParameter {
        /// Offending parameter, when one can be named.
        parameter: Option<String>,
        /// Human-readable explanation.
        description: String,
    },

    /// No handler is registered under the method name.
    #[error("Method not found: {method}")]
    MethodNotFound { method: String },

    /// The interface name is unknown.
    #[error("Interface not found: {interface}")]
    InterfaceNotFound { interface: String },

    /// No server connection carries the tag.
    #[error("Server not found: {server}")]
    ServerNotFound { server: String },

    /// The service is stopping.
    #[error("Service is shutting down")]
    ServiceShutdown,
}

impl VarlinkError {
    /// Creates an invalid parameter error that names no parameter.
    pub fn invalid(description: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: None,
            description: description.into(),
        }
    }

    /// Creates an invalid parameter error for a named parameter.
    pub fn invalid_parameter(parameter: impl Into<String>, description: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: Some(parameter.into()),
            description: description.into(),
        }
    }

    /// Creates a method not found error.
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::MethodNotFound {
            method: method.into(),
        }
    }

    /// Creates an interface not found error.
    pub fn interface_not_found(interface: impl Into<String>) -> Self {
        Self::InterfaceNotFound {
            interface: interface.into(),
        }
    }

    /// Creates a server not found error.
    pub fn server_not_found(server: impl Into<String>) -> Self {
        Self::ServerNotFound {
            server: server.into(),
        }
    }

    /// Returns the wire name of the error.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidParameter { .. } => errors::INVALID_PARAMETER,
            Self::MethodNotFound { .. } => errors::METHOD_NOT_FOUND,
            Self::InterfaceNotFound { .. } => errors::INTERFACE_NOT_FOUND,
            Self::ServerNotFound { .. } => errors::SERVER_NOT_FOUND,
            Self::ServiceShutdown => errors::SERVICE_SHUTDOWN,
        }
    }

    /// Builds the reply parameters: `description` plus structured fields.
    pub fn parameters(&self) -> Map<String, Value> {
        let mut parameters = Map::new();
        parameters.insert("description".into(), Value::String(self.to_string()));
        let extra = match self {
            Self::InvalidParameter {
                parameter: Some(parameter),
                ..
            } => Some(("parameter", parameter)),
            Self::MethodNotFound { method } => Some(("method", method)),
            Self::InterfaceNotFound { interface } => Some(("interface", interface)),
            Self::ServerNotFound { server } => Some(("server", server)),
            Self::InvalidParameter {
                parameter: None, ..
            }
            | Self::ServiceShutdown => None,
        };
        if let Some((key, value)) = extra {
            parameters.insert(key.into(), Value::String(value.clone()));
        }
        parameters
    }

    /// Converts the error into an error reply.
    pub fn to_reply(&self) -> Reply {
        Reply::failure(self.name(), self.parameters())
    }
}

impl From<VarlinkError> for Reply {
    fn from(error: VarlinkError) -> Self {
        error.to_reply()
    }
}
