use camino::Utf8PathBuf;
use std::env;

#[cfg(unix)]
use libc::geteuid;

#[cfg(unix)]
use dirs::home_dir;

use crate::logging::LogFormat;

/// File name of the socket inside the data directory.
pub const SOCKET_FILE_NAME: &str = "varlink.sock";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binaries.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format for the binaries.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Data directory holding the socket: `$HOME/.irssi`.
///
/// Without a home directory the system temporary directory is used,
/// namespaced by effective uid so users cannot collide.
#[must_use]
pub fn default_data_directory() -> Utf8PathBuf {
    #[cfg(unix)]
    {
        if let Some(home) = home_dir().and_then(|path| Utf8PathBuf::from_path_buf(path).ok()) {
            return home.join(".irssi");
        }
        let mut base = fallback_base_directory();
        base.push("irssi");
        base.push(format!("uid-{}", unsafe { geteuid() }));
        base
    }

    #[cfg(not(unix))]
    {
        let mut base = fallback_base_directory();
        base.push("irssi");
        base
    }
}

/// Computes the default socket path.
#[must_use]
pub fn default_socket_path() -> Utf8PathBuf {
    default_data_directory().join(SOCKET_FILE_NAME)
}

fn fallback_base_directory() -> Utf8PathBuf {
    let candidate = env::temp_dir();
    Utf8PathBuf::from_path_buf(candidate).unwrap_or_else(|_| Utf8PathBuf::from("/tmp"))
}
