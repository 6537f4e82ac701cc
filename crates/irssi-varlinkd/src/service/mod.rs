//! The varlink service loop.
//!
//! [`Service`] owns the listener, every session, the dispatcher, and the
//! readiness registrations. It runs on a single thread: a turn waits for
//! readiness, then serves session input before accepting connections and
//! draining events queued through [`EventSender`], each to completion
//! before the next. Hosts either call [`Service::run`] or drive [`Service::turn`] from
//! their own loop.

mod shutdown;
mod signals;

use std::io;
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::broadcast::{self, DeliveryReport};
use crate::dispatch::{CallContext, Dispatcher};
use crate::event::Event;
use crate::health::HealthReporter;
use crate::host::ServerRegistry;
use crate::reactor::{
    EventSender, Inbox, InboxMessage, PollReadiness, ReactorError, Readiness, Token, inbox,
};
use crate::transport::{
    LISTENER_TARGET, ListenerError, ReadOutcome, SessionId, SessionRegistry, SocketListener,
};

use self::signals::SignalPipe;

const SERVICE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::service");

/// Errors raised while starting or running the service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The listening socket could not be set up.
    #[error("failed to start socket listener: {0}")]
    Listener(#[from] ListenerError),
    /// The cross-thread wake-up channel could not be created.
    #[error("failed to create event inbox: {source}")]
    Inbox {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Signal handlers could not be installed.
    #[error("failed to install signal handlers: {source}")]
    Signals {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Waiting for readiness failed.
    #[error(transparent)]
    Reactor(#[from] ReactorError),
}

/// Result of one [`Service::turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// The service is still accepting work.
    Continue,
    /// A stop was requested and the shutdown handshake has run.
    Stopped,
}

/// A running varlink endpoint.
pub struct Service {
    socket: PathBuf,
    listener: Option<SocketListener>,
    readiness: Box<dyn Readiness>,
    sessions: SessionRegistry,
    dispatcher: Dispatcher,
    servers: Box<dyn ServerRegistry>,
    reporter: Arc<dyn HealthReporter>,
    inbox: Inbox,
    sender: EventSender,
    signals: Option<SignalPipe>,
    stopped: bool,
}

impl Service {
    /// Binds the socket at `socket` and starts watching it.
    ///
    /// A stale socket left by an earlier run is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the socket cannot be bound or the inbox
    /// cannot be created. The failure is also passed to the reporter.
    pub fn start<S>(
        socket: impl AsRef<Path>,
        servers: S,
        reporter: Arc<dyn HealthReporter>,
    ) -> Result<Self, ServiceError>
    where
        S: ServerRegistry + 'static,
    {
        let socket = socket.as_ref();
        reporter.service_starting(socket);
        match Self::bind(socket, Box::new(servers), Arc::clone(&reporter)) {
            Ok(service) => {
                reporter.service_ready(socket);
                Ok(service)
            }
            Err(error) => {
                reporter.service_failed(&error);
                Err(error)
            }
        }
    }

    fn bind(
        socket: &Path,
        servers: Box<dyn ServerRegistry>,
        reporter: Arc<dyn HealthReporter>,
    ) -> Result<Self, ServiceError> {
        let (sender, inbox) = inbox().map_err(|source| ServiceError::Inbox { source })?;
        let listener = SocketListener::bind(socket)?;

        let mut readiness: Box<dyn Readiness> = Box::new(PollReadiness::new());
        readiness.register(Token::Listener, listener.as_raw_fd());
        readiness.register(Token::Inbox, inbox.as_raw_fd());

        Ok(Self {
            socket: listener.path().to_path_buf(),
            listener: Some(listener),
            readiness,
            sessions: SessionRegistry::default(),
            dispatcher: Dispatcher::new(),
            servers,
            reporter,
            inbox,
            sender,
            signals: None,
            stopped: false,
        })
    }

    /// Stops the service on SIGINT, SIGTERM, SIGHUP, or SIGQUIT.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Signals`] when a handler cannot be installed.
    pub fn watch_signals(&mut self) -> Result<(), ServiceError> {
        if self.signals.is_some() || self.stopped {
            return Ok(());
        }
        let pipe = SignalPipe::install().map_err(|source| ServiceError::Signals { source })?;
        self.readiness.register(Token::Signals, pipe.as_raw_fd());
        self.signals = Some(pipe);
        Ok(())
    }

    /// Path of the bound socket.
    pub fn socket_path(&self) -> &Path {
        &self.socket
    }

    /// Handle for queueing events and stop requests from other threads.
    pub fn event_sender(&self) -> EventSender {
        self.sender.clone()
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Returns false once the shutdown handshake has run.
    pub fn is_running(&self) -> bool {
        !self.stopped
    }

    /// Runs turns until a stop request or termination signal arrives.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Reactor`] when readiness polling fails; the
    /// shutdown handshake has run by then.
    pub fn run(&mut self) -> Result<(), ServiceError> {
        loop {
            match self.turn(None) {
                Ok(Turn::Continue) => {}
                Ok(Turn::Stopped) => return Ok(()),
                Err(error) => {
                    self.reporter.internal_error("readiness wait", &error);
                    self.shutdown();
                    return Err(error);
                }
            }
        }
    }

    /// Waits up to `timeout` for readiness and handles whatever is ready.
    ///
    /// `None` waits until something happens.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Reactor`] when readiness polling fails.
    pub fn turn(&mut self, timeout: Option<Duration>) -> Result<Turn, ServiceError> {
        if self.stopped {
            return Ok(Turn::Stopped);
        }

        // Session input goes first so peers that hung up this round are
        // gone before queued events are fanned out.
        let (sessions, others): (Vec<Token>, Vec<Token>) = self
            .readiness
            .wait(timeout)?
            .into_iter()
            .partition(|token| matches!(token, Token::Session(_)));

        let mut stop = false;
        for token in sessions.into_iter().chain(others) {
            match token {
                Token::Listener => self.accept(),
                Token::Inbox => stop |= self.drain_inbox(),
                Token::Signals => stop |= self.drain_signals(),
                Token::Session(id) => self.serve(id),
            }
        }

        if stop {
            self.shutdown();
            return Ok(Turn::Stopped);
        }
        Ok(Turn::Continue)
    }

    /// Delivers `event` to every waiting session.
    pub fn publish(&mut self, event: &Event) -> DeliveryReport {
        if self.stopped {
            return DeliveryReport::default();
        }
        let report = broadcast::publish(&mut self.sessions, event, &*self.reporter);
        for &id in &report.disconnected {
            self.disconnect(id);
        }
        report
    }

    /// Notifies and disconnects every session, then removes the socket.
    ///
    /// Calling it again does nothing.
    pub fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.reporter.service_stopping(self.sessions.len());

        let closed = shutdown::close_sessions(
            &mut self.sessions,
            &mut *self.readiness,
            &*self.reporter,
        );

        self.readiness.unregister(Token::Listener);
        if let Some(listener) = self.listener.take() {
            listener.close();
        }
        self.readiness.unregister(Token::Inbox);
        self.readiness.unregister(Token::Signals);
        if let Some(signals) = self.signals.take() {
            signals.uninstall();
        }

        debug!(target: SERVICE_TARGET, closed, "sessions closed");
        self.reporter.service_stopped();
    }

    fn accept(&mut self) {
        let Some(listener) = self.listener.as_ref() else {
            return;
        };
        let stream = match listener.accept() {
            Ok(Some(stream)) => stream,
            Ok(None) => return,
            Err(error) => {
                self.reporter.internal_error("accept", &error);
                return;
            }
        };
        match self.sessions.insert(stream) {
            Ok(id) => {
                if let Some(session) = self.sessions.get(id) {
                    self.readiness.register(Token::Session(id), session.as_raw_fd());
                }
                self.reporter.client_connected(id);
            }
            Err(error) => self.reporter.internal_error("session setup", &error),
        }
    }

    fn serve(&mut self, id: SessionId) {
        let Some(session) = self.sessions.get_mut(id) else {
            self.readiness.unregister(Token::Session(id));
            return;
        };

        let frames = match session.read_available() {
            ReadOutcome::Frames(frames) => frames,
            ReadOutcome::Closed => {
                self.disconnect(id);
                return;
            }
            ReadOutcome::Overflow(error) => {
                warn!(
                    target: LISTENER_TARGET,
                    session = %id,
                    error = %error,
                    "closing session"
                );
                self.disconnect(id);
                return;
            }
        };

        for frame in frames {
            let mut context = CallContext {
                session: id,
                sessions: &mut self.sessions,
                servers: &mut *self.servers,
                reporter: &*self.reporter,
            };
            let Some(reply) = self.dispatcher.handle_frame(&mut context, &frame) else {
                continue;
            };
            let Some(session) = self.sessions.get_mut(id) else {
                break;
            };
            match session.write_reply(&reply) {
                Ok(()) => {}
                Err(error) if error.is_disconnect() => {
                    self.disconnect(id);
                    break;
                }
                Err(error) => self.reporter.delivery_failed(id, &error),
            }
        }
    }

    fn disconnect(&mut self, id: SessionId) {
        self.readiness.unregister(Token::Session(id));
        if self.sessions.remove(id).is_some() {
            self.reporter.client_disconnected(id);
        }
    }

    fn drain_inbox(&mut self) -> bool {
        let mut stop = false;
        for message in self.inbox.drain() {
            match message {
                InboxMessage::Publish(event) => {
                    self.publish(&event);
                }
                InboxMessage::Stop => stop = true,
            }
        }
        stop
    }

    fn drain_signals(&mut self) -> bool {
        let received = self
            .signals
            .as_mut()
            .is_some_and(SignalPipe::drain);
        if received {
            info!(target: SERVICE_TARGET, "termination signal received");
        }
        received
    }
}

impl Drop for Service {
    fn drop(&mut self) {
        self.shutdown();
    }
}
