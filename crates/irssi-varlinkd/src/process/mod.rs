//! Process entry point for the standalone service binary.

mod errors;
mod launch;

pub use errors::LaunchError;
pub use launch::{ConfigLoader, StaticConfigLoader, SystemConfigLoader, run_daemon, run_daemon_with};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
