//! Translation from parsed subcommands into varlink calls.
//!
//! Each subcommand maps onto exactly one [`CallRequest`]. The invocation also
//! records how replies are rendered, so the runtime only has to move frames
//! between the socket and stdout.

use irssi_varlink_types::CallRequest;
use irssi_varlink_types::names::methods;
use serde_json::{Map, Value};

use crate::AppError;
use crate::cli::CliCommand;

/// How a reply is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rendering {
    /// One compact JSON document per line.
    Json,
    /// The `description` text of a successful reply.
    Description,
}

#[derive(Debug)]
pub(crate) struct Invocation {
    pub(crate) call: CallRequest,
    pub(crate) rendering: Rendering,
}

impl Invocation {
    fn json(call: CallRequest) -> Self {
        Self {
            call,
            rendering: Rendering::Json,
        }
    }

    /// Returns true when the call asks for a reply stream.
    pub(crate) const fn is_streaming(&self) -> bool {
        self.call.more
    }
}

impl TryFrom<CliCommand> for Invocation {
    type Error = AppError;

    fn try_from(command: CliCommand) -> Result<Self, Self::Error> {
        let invocation = match command {
            CliCommand::Info => Self::json(CallRequest::new(methods::GET_INFO)),
            CliCommand::Describe { interface } => Self {
                call: CallRequest::new(methods::GET_INTERFACE_DESCRIPTION)
                    .with_parameter("interface", interface),
                rendering: Rendering::Description,
            },
            CliCommand::Call {
                method,
                parameters,
                more,
            } => {
                let parameters = parameters
                    .as_deref()
                    .map(parse_parameters)
                    .transpose()?
                    .unwrap_or_default();
                Self::json(
                    CallRequest::new(method)
                        .with_parameters(parameters)
                        .streaming(more),
                )
            }
            CliCommand::Wait { follow } => {
                Self::json(CallRequest::new(methods::WAIT_FOR_EVENT).streaming(follow))
            }
            CliCommand::Send {
                server,
                target,
                message,
            } => Self::json(
                CallRequest::new(methods::SEND_MESSAGE)
                    .with_parameter("target", target)
                    .with_parameter("message", message)
                    .with_parameter("server", server),
            ),
            CliCommand::Nick { server } => Self::json(
                CallRequest::new(methods::GET_SERVER_NICK).with_parameter("server", server),
            ),
            CliCommand::TestEvent { message } => {
                let call = CallRequest::new(methods::TEST_EVENT);
                Self::json(match message {
                    Some(text) => call.with_parameter("message", text),
                    None => call,
                })
            }
        };
        Ok(invocation)
    }
}

fn parse_parameters(text: &str) -> Result<Map<String, Value>, AppError> {
    match serde_json::from_str::<Value>(text).map_err(AppError::ParseParameters)? {
        Value::Object(parameters) => Ok(parameters),
        _ => Err(AppError::ParametersNotObject),
    }
}
