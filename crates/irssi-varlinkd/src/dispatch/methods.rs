//! The method table and its handlers.

use std::collections::HashMap;

use irssi_varlink_types::Reply;
use irssi_varlink_types::names::methods;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::{Call, DISPATCH_TARGET, VarlinkError};
use crate::broadcast;
use crate::event::{Event, unix_timestamp};
use crate::health::HealthReporter;
use crate::host::ServerRegistry;
use crate::interface;
use crate::transport::{SessionId, SessionRegistry, WaitMode};

const DEFAULT_TEST_MESSAGE: &str = "test message";

/// State a handler may touch while serving one call.
pub(crate) struct CallContext<'a> {
    /// Session that issued the call.
    pub(crate) session: SessionId,
    pub(crate) sessions: &'a mut SessionRegistry,
    pub(crate) servers: &'a mut dyn ServerRegistry,
    pub(crate) reporter: &'a dyn HealthReporter,
}

/// What a handler produced.
#[derive(Debug, PartialEq)]
pub(crate) enum Outcome {
    /// Reply now with these parameters.
    Reply(Map<String, Value>),
    /// The reply will come from a later broadcast.
    Deferred,
}

type Handler = fn(&mut CallContext<'_>, &Call) -> Result<Outcome, VarlinkError>;

/// Maps exact method names to handlers.
pub(crate) struct Dispatcher {
    handlers: HashMap<&'static str, Handler>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Builds the dispatcher with every supported method registered.
    pub(crate) fn new() -> Self {
        let mut handlers: HashMap<&'static str, Handler> = HashMap::new();
        handlers.insert(methods::GET_INFO, get_info);
        handlers.insert(methods::GET_INTERFACE_DESCRIPTION, get_interface_description);
        handlers.insert(methods::WAIT_FOR_EVENT, wait_for_event);
        handlers.insert(methods::SEND_MESSAGE, send_message);
        handlers.insert(methods::GET_SERVER_NICK, get_server_nick);
        handlers.insert(methods::TEST_EVENT, test_event);
        Self { handlers }
    }

    /// Decodes, validates, and dispatches one frame.
    ///
    /// Returns the reply to write now, or `None` when the reply is deferred.
    pub(crate) fn handle_frame(&self, context: &mut CallContext<'_>, frame: &[u8]) -> Option<Reply> {
        let call = match Call::parse(frame) {
            Ok(call) => call,
            Err(error) => {
                context.reporter.call_failed(context.session, None, &error);
                return Some(error.to_reply());
            }
        };

        match self.dispatch(context, &call) {
            Ok(Outcome::Reply(parameters)) => Some(Reply::success(parameters)),
            Ok(Outcome::Deferred) => None,
            Err(error) => {
                context
                    .reporter
                    .call_failed(context.session, Some(call.method()), &error);
                Some(error.to_reply())
            }
        }
    }

    /// Runs the handler registered for the call's method.
    pub(crate) fn dispatch(
        &self,
        context: &mut CallContext<'_>,
        call: &Call,
    ) -> Result<Outcome, VarlinkError> {
        debug!(
            target: DISPATCH_TARGET,
            session = %context.session,
            method = call.method(),
            more = call.more(),
            oneway = call.oneway(),
            "dispatching call"
        );
        let handler = self
            .handlers
            .get(call.method())
            .ok_or_else(|| VarlinkError::method_not_found(call.method()))?;
        handler(context, call)
    }
}

fn get_info(_context: &mut CallContext<'_>, _call: &Call) -> Result<Outcome, VarlinkError> {
    Ok(Outcome::Reply(interface::info_parameters()))
}

fn get_interface_description(
    _context: &mut CallContext<'_>,
    call: &Call,
) -> Result<Outcome, VarlinkError> {
    // An absent or non-string name simply matches no interface.
    let name = call.string_parameter("interface").unwrap_or_default();
    let description =
        interface::description_of(name).ok_or_else(|| VarlinkError::interface_not_found(name))?;
    Ok(Outcome::Reply(single("description", json!(description))))
}

fn wait_for_event(context: &mut CallContext<'_>, call: &Call) -> Result<Outcome, VarlinkError> {
    if let Some(session) = context.sessions.get_mut(context.session) {
        session.set_mode(WaitMode::for_call(call.more()));
    }
    Ok(Outcome::Deferred)
}

fn send_message(context: &mut CallContext<'_>, call: &Call) -> Result<Outcome, VarlinkError> {
    let target = required_string(call, "target")?;
    let message = call
        .string_parameter("message")
        .ok_or_else(|| VarlinkError::invalid_parameter("message", "Missing parameter: message"))?;
    let server = required_string(call, "server")?;

    let connection = context
        .servers
        .find_by_tag(server)
        .ok_or_else(|| VarlinkError::server_not_found(server))?;
    connection.send_message(target, message);
    Ok(Outcome::Reply(single("success", json!(true))))
}

fn get_server_nick(context: &mut CallContext<'_>, call: &Call) -> Result<Outcome, VarlinkError> {
    let server = required_string(call, "server")?;
    let connection = context
        .servers
        .find_by_tag(server)
        .ok_or_else(|| VarlinkError::server_not_found(server))?;
    Ok(Outcome::Reply(single("nick", json!(connection.nick()))))
}

fn test_event(context: &mut CallContext<'_>, call: &Call) -> Result<Outcome, VarlinkError> {
    let message = call
        .string_parameter("message")
        .unwrap_or(DEFAULT_TEST_MESSAGE);
    let event = Event::test(message, unix_timestamp());
    // Hung-up peers are torn down when the reactor reads their EOF.
    broadcast::publish(context.sessions, &event, context.reporter);
    Ok(Outcome::Reply(single("success", json!(true))))
}

/// Returns a non-empty string parameter.
fn required_string<'c>(call: &'c Call, name: &str) -> Result<&'c str, VarlinkError> {
    call.string_parameter(name)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| VarlinkError::invalid_parameter(name, format!("Missing parameter: {name}")))
}

fn single(key: &str, value: Value) -> Map<String, Value> {
    let mut parameters = Map::new();
    parameters.insert(key.into(), value);
    parameters
}
