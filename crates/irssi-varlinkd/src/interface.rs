//! Static service metadata and the interface description.

use serde_json::{Map, Value, json};

use irssi_varlink_types::names::interfaces;

/// Vendor reported by `GetInfo`.
pub const VENDOR: &str = "irssi-varlink";
/// Product reported by `GetInfo`.
pub const PRODUCT: &str = "irssi varlink bridge";
/// Version reported by `GetInfo`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Project URL reported by `GetInfo`.
pub const URL: &str = "https://irssi.org";

/// Interface description served by `GetInterfaceDescription`.
pub const INTERFACE_DESCRIPTION: &str = "\
# Bridge between irssi and local varlink clients.
interface org.irssi.varlink

type IrcEvent (
  type: string,
  subtype: string,
  server: string,
  target: string,
  nick: string,
  address: ?string,
  message: string,
  timestamp: int
)

# Waits for the next IRC event. With `more`, streams every event until the
# connection closes.
method WaitForEvent() -> (event: IrcEvent)

# Sends a message to a channel or nick through the tagged server.
method SendMessage(target: string, message: string, server: string) -> (success: bool)

# Returns the nick in use on the tagged server.
method GetServerNick(server: string) -> (nick: string)

# Publishes a synthetic event to waiting clients.
method TestEvent(message: ?string) -> (success: bool)

error ServerNotFound (server: string)
";

/// Interfaces the service implements.
pub const INTERFACES: &[&str] = &[interfaces::SERVICE, interfaces::IRSSI];

/// Reply parameters for `GetInfo`.
pub fn info_parameters() -> Map<String, Value> {
    let mut parameters = Map::new();
    parameters.insert("vendor".into(), json!(VENDOR));
    parameters.insert("product".into(), json!(PRODUCT));
    parameters.insert("version".into(), json!(VERSION));
    parameters.insert("url".into(), json!(URL));
    parameters.insert("interfaces".into(), json!(INTERFACES));
    parameters
}

/// Returns the description of `interface`, when it is described.
pub fn description_of(interface: &str) -> Option<&'static str> {
    (interface == interfaces::IRSSI).then_some(INTERFACE_DESCRIPTION)
}
