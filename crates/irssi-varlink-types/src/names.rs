//! Method, error, and interface names used on the wire.
//!
//! Names are case-sensitive and must match exactly.

/// Interface names.
pub mod interfaces {
    /// Built-in varlink service interface.
    pub const SERVICE: &str = "org.varlink.service";
    /// Interface exposed by the irssi bridge.
    pub const IRSSI: &str = "org.irssi.varlink";
}

/// Method names.
pub mod methods {
    /// Returns vendor, product, version, URL, and interface list.
    pub const GET_INFO: &str = "org.varlink.service.GetInfo";
    /// Returns the interface description text.
    pub const GET_INTERFACE_DESCRIPTION: &str = "org.varlink.service.GetInterfaceDescription";
    /// Subscribes the caller to the next event, or to every event with `more`.
    pub const WAIT_FOR_EVENT: &str = "org.irssi.varlink.WaitForEvent";
    /// Sends a message through a server connection.
    pub const SEND_MESSAGE: &str = "org.irssi.varlink.SendMessage";
    /// Returns the current nick on a server connection.
    pub const GET_SERVER_NICK: &str = "org.irssi.varlink.GetServerNick";
    /// Publishes a synthetic event.
    pub const TEST_EVENT: &str = "org.irssi.varlink.TestEvent";
}

/// Error names.
pub mod errors {
    /// A call or one of its parameters is malformed.
    pub const INVALID_PARAMETER: &str = "org.varlink.service.InvalidParameter";
    /// The requested method does not exist.
    pub const METHOD_NOT_FOUND: &str = "org.varlink.service.MethodNotFound";
    /// The requested interface does not exist.
    pub const INTERFACE_NOT_FOUND: &str = "org.varlink.service.InterfaceNotFound";
    /// No server connection carries the requested tag.
    pub const SERVER_NOT_FOUND: &str = "org.irssi.varlink.ServerNotFound";
    /// The service is stopping; the connection will close.
    pub const SERVICE_SHUTDOWN: &str = "org.varlink.service.ServiceShutdown";
}
