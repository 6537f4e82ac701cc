//! Structured health reporting for service lifecycle events.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use crate::dispatch::VarlinkError;
use crate::service::ServiceError;
use crate::transport::{SessionId, SessionWriteError};

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before the listener is bound.
    fn service_starting(&self, socket: &Path);

    /// Invoked once the service accepts connections.
    fn service_ready(&self, socket: &Path);

    /// Invoked when the service cannot start.
    fn service_failed(&self, error: &ServiceError);

    /// Invoked after a connection is accepted.
    fn client_connected(&self, session: SessionId);

    /// Invoked after a session is torn down because its peer went away.
    fn client_disconnected(&self, session: SessionId);

    /// Invoked when a call is answered with an error reply.
    fn call_failed(&self, session: SessionId, method: Option<&str>, error: &VarlinkError);

    /// Invoked when a reply or event could not be written to a session.
    fn delivery_failed(&self, session: SessionId, error: &SessionWriteError);

    /// Invoked when the service itself misbehaves.
    fn internal_error(&self, context: &str, error: &dyn Error);

    /// Invoked before the shutdown handshake runs.
    fn service_stopping(&self, sessions: usize);

    /// Invoked after every session and the listener are released.
    fn service_stopped(&self);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn service_starting(&self, socket: &Path) {
        (**self).service_starting(socket);
    }

    fn service_ready(&self, socket: &Path) {
        (**self).service_ready(socket);
    }

    fn service_failed(&self, error: &ServiceError) {
        (**self).service_failed(error);
    }

    fn client_connected(&self, session: SessionId) {
        (**self).client_connected(session);
    }

    fn client_disconnected(&self, session: SessionId) {
        (**self).client_disconnected(session);
    }

    fn call_failed(&self, session: SessionId, method: Option<&str>, error: &VarlinkError) {
        (**self).call_failed(session, method, error);
    }

    fn delivery_failed(&self, session: SessionId, error: &SessionWriteError) {
        (**self).delivery_failed(session, error);
    }

    fn internal_error(&self, context: &str, error: &dyn Error) {
        (**self).internal_error(context, error);
    }

    fn service_stopping(&self, sessions: usize) {
        (**self).service_stopping(sessions);
    }

    fn service_stopped(&self) {
        (**self).service_stopped();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn service_starting(&self, socket: &Path) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "service_starting",
            socket = %socket.display(),
            "starting varlink service"
        );
    }

    fn service_ready(&self, socket: &Path) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "service_ready",
            socket = %socket.display(),
            "varlink service ready"
        );
    }

    fn service_failed(&self, error: &ServiceError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "service_failed",
            error = %error,
            "varlink service failed to start"
        );
    }

    fn client_connected(&self, session: SessionId) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "client_connected",
            session = %session,
            "client connected"
        );
    }

    fn client_disconnected(&self, session: SessionId) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "client_disconnected",
            session = %session,
            "client disconnected"
        );
    }

    fn call_failed(&self, session: SessionId, method: Option<&str>, error: &VarlinkError) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "call_failed",
            session = %session,
            method = method.unwrap_or("<none>"),
            error_name = error.name(),
            error = %error,
            "call answered with error"
        );
    }

    fn delivery_failed(&self, session: SessionId, error: &SessionWriteError) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "delivery_failed",
            session = %session,
            error = %error,
            "failed to write to client"
        );
    }

    fn internal_error(&self, context: &str, error: &dyn Error) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "internal_error",
            context,
            error = %error,
            "internal service error"
        );
    }

    fn service_stopping(&self, sessions: usize) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "service_stopping",
            sessions,
            "stopping varlink service"
        );
    }

    fn service_stopped(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "service_stopped",
            "varlink service stopped"
        );
    }
}
