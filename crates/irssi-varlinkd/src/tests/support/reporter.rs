//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::error::Error;
use std::path::Path;
use std::sync::Mutex;

use crate::dispatch::VarlinkError;
use crate::health::HealthReporter;
use crate::service::ServiceError;
use crate::transport::{SessionId, SessionWriteError};

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    ServiceStarting,
    ServiceReady,
    ServiceFailed(String),
    ClientConnected(SessionId),
    ClientDisconnected(SessionId),
    CallFailed { method: Option<String>, error: String },
    DeliveryFailed(SessionId),
    InternalError { context: String, error: String },
    ServiceStopping(usize),
    ServiceStopped,
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    /// Counts the recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&HealthEvent) -> bool) -> usize {
        self.events().iter().filter(|event| predicate(event)).count()
    }

    pub fn disconnects(&self) -> usize {
        self.count(|event| matches!(event, HealthEvent::ClientDisconnected(_)))
    }

    pub fn internal_errors(&self) -> usize {
        self.count(|event| matches!(event, HealthEvent::InternalError { .. }))
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn service_starting(&self, _socket: &Path) {
        self.record(HealthEvent::ServiceStarting);
    }

    fn service_ready(&self, _socket: &Path) {
        self.record(HealthEvent::ServiceReady);
    }

    fn service_failed(&self, error: &ServiceError) {
        self.record(HealthEvent::ServiceFailed(error.to_string()));
    }

    fn client_connected(&self, session: SessionId) {
        self.record(HealthEvent::ClientConnected(session));
    }

    fn client_disconnected(&self, session: SessionId) {
        self.record(HealthEvent::ClientDisconnected(session));
    }

    fn call_failed(&self, _session: SessionId, method: Option<&str>, error: &VarlinkError) {
        self.record(HealthEvent::CallFailed {
            method: method.map(str::to_owned),
            error: error.name().to_owned(),
        });
    }

    fn delivery_failed(&self, session: SessionId, _error: &SessionWriteError) {
        self.record(HealthEvent::DeliveryFailed(session));
    }

    fn internal_error(&self, context: &str, error: &dyn Error) {
        self.record(HealthEvent::InternalError {
            context: context.to_owned(),
            error: error.to_string(),
        });
    }

    fn service_stopping(&self, sessions: usize) {
        self.record(HealthEvent::ServiceStopping(sessions));
    }

    fn service_stopped(&self) {
        self.record(HealthEvent::ServiceStopped);
    }
}
