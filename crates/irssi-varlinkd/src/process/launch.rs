//! Launch sequence for the standalone service.

use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use tracing::info;

use irssi_varlink_config::Config;

use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::host::StaticServerRegistry;
use crate::service::Service;
use crate::telemetry;

use super::PROCESS_TARGET;
use super::errors::LaunchError;

/// Source of the service configuration.
pub trait ConfigLoader: Send + Sync {
    /// Loads the configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`], reading defaults, the
/// configuration file, the environment, and the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that hands out a fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Runs the service with the production collaborators until a termination
/// signal arrives.
pub fn run_daemon() -> Result<(), LaunchError> {
    run_daemon_with(&SystemConfigLoader, Arc::new(StructuredHealthReporter::new()))
}

/// Runs the service with injected collaborators.
///
/// Loads configuration, installs telemetry, prepares the socket directory,
/// starts the service over the configured servers, and serves until a
/// termination signal or stop request. The shutdown handshake always runs
/// before this returns.
pub fn run_daemon_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<(), LaunchError> {
    let config = loader.load()?;
    telemetry::initialise(&config)?;
    config.prepare_socket_directory()?;

    let servers = StaticServerRegistry::from_directives(&config.servers());
    info!(
        target: PROCESS_TARGET,
        socket = %config.socket_path(),
        servers = servers.len(),
        "launching varlink service"
    );

    let mut service = Service::start(config.socket_path(), servers, reporter)?;
    service.watch_signals()?;
    service.run()?;

    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}
