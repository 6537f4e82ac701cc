//! Shared configuration for the irssi varlink daemon and client.
//!
//! Values are layered by `ortho_config`: built-in defaults, then an optional
//! TOML file (`--config-path` or `IRSSI_VARLINK_CONFIG_PATH`), then
//! `IRSSI_VARLINK_*` environment variables, then command-line flags.

mod defaults;
mod logging;
mod servers;
mod socket;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, SOCKET_FILE_NAME, default_data_directory, default_log_filter,
    default_log_filter_string, default_log_format, default_socket_path,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use servers::{ServerDirective, ServerDirectiveParseError, deduplicate_servers};
pub use socket::{SocketPreparationError, prepare_socket_directory};

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "IRSSI_VARLINK")]
pub struct Config {
    /// Filesystem path of the varlink socket.
    #[ortho_config(default = default_socket_path())]
    pub socket_path: Utf8PathBuf,
    /// `tracing` filter expression applied to log output.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Server connections hosted by the standalone daemon, as `TAG=NICK`.
    #[ortho_config(merge_strategy = "append")]
    #[serde(default)]
    pub servers: Vec<ServerDirective>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            servers: Vec::new(),
        }
    }
}

impl Config {
    /// Path of the varlink socket.
    #[must_use]
    pub fn socket_path(&self) -> &Utf8Path {
        &self.socket_path
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Declared server connections with duplicate tags collapsed, last one
    /// winning.
    #[must_use]
    pub fn servers(&self) -> Vec<ServerDirective> {
        let mut servers = self.servers.clone();
        deduplicate_servers(&mut servers);
        servers
    }

    /// Ensures the socket's parent directory exists.
    ///
    /// # Errors
    ///
    /// See [`prepare_socket_directory`].
    pub fn prepare_socket_directory(&self) -> Result<(), SocketPreparationError> {
        prepare_socket_directory(self.socket_path())
    }
}
