//! BDD world: a service on a temporary socket, driven turn by turn from the
//! test thread, and the clients talking to it.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::os::unix::net::UnixListener;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tempfile::TempDir;

use crate::event::Event;
use crate::host::{Outbox, StaticServerRegistry};
use crate::service::{Service, ServiceError, Turn};

use super::client::TestClient;
use super::reporter::RecordingHealthReporter;

const SETTLE_TURNS: usize = 5;
const TURN_TIMEOUT: Duration = Duration::from_millis(10);

/// Scenario world shared across BDD steps.
pub struct ServiceWorld {
    dir: TempDir,
    servers: Vec<(String, String)>,
    service: Option<Service>,
    start_error: Option<ServiceError>,
    pub reporter: Arc<RecordingHealthReporter>,
    pub outbox: Option<Outbox>,
    clients: BTreeMap<String, TestClient>,
    pub replies: Vec<Value>,
    pub blocker: Option<UnixListener>,
}

impl ServiceWorld {
    /// Builds a world with no service running yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
            servers: Vec::new(),
            service: None,
            start_error: None,
            reporter: Arc::new(RecordingHealthReporter::default()),
            outbox: None,
            clients: BTreeMap::new(),
            replies: Vec::new(),
            blocker: None,
        }
    }

    pub fn socket_path(&self) -> PathBuf {
        self.dir.path().join("varlink.sock")
    }

    pub fn host_server(&mut self, tag: &str, nick: &str) {
        self.servers.push((tag.to_owned(), nick.to_owned()));
    }

    /// Starts the service on the world's socket path.
    pub fn start(&mut self) {
        let mut servers = StaticServerRegistry::new();
        for (tag, nick) in &self.servers {
            servers.insert(tag.clone(), nick.clone());
        }
        self.outbox = Some(servers.outbox());
        match Service::start(self.socket_path(), servers, self.reporter.clone()) {
            Ok(service) => self.service = Some(service),
            Err(error) => self.start_error = Some(error),
        }
    }

    pub fn start_error(&self) -> Option<&ServiceError> {
        self.start_error.as_ref()
    }

    pub fn service(&mut self) -> &mut Service {
        self.service.as_mut().expect("service should be running")
    }

    /// Runs enough turns for queued connections and input to be handled.
    pub fn settle(&mut self) {
        let Some(service) = self.service.as_mut() else {
            return;
        };
        for _ in 0..SETTLE_TURNS {
            match service.turn(Some(TURN_TIMEOUT)) {
                Ok(Turn::Continue) => {}
                Ok(Turn::Stopped) => break,
                Err(error) => panic!("service turn failed: {error}"),
            }
        }
    }

    /// Connects a named client and lets the service accept it.
    pub fn connect(&mut self, name: &str) {
        let client = TestClient::connect(&self.socket_path());
        self.clients.insert(name.to_owned(), client);
        self.settle();
    }

    pub fn client(&mut self, name: &str) -> &mut TestClient {
        self.clients
            .get_mut(name)
            .unwrap_or_else(|| panic!("no client named {name}"))
    }

    /// Sends `call` from `name`, lets the service run, and keeps the reply.
    pub fn call(&mut self, name: &str, call: &Value) -> Value {
        self.client(name).send(call);
        self.settle();
        let reply = self.client(name).read_frame();
        self.replies.push(reply.clone());
        reply
    }

    /// Sends a call that is answered later, then lets the service run.
    pub fn call_deferred(&mut self, name: &str, call: &Value) {
        self.client(name).send(call);
        self.settle();
    }

    pub fn publish(&mut self, event: &Event) {
        self.service().publish(event);
    }

    /// Closes the named client's connection without letting the service run.
    pub fn hang_up(&mut self, name: &str) {
        drop(self.clients.remove(name));
    }

    /// Queues `event` through the cross-thread sender and runs one turn.
    pub fn queue_and_turn(&mut self, event: Event) {
        let service = self.service();
        service
            .event_sender()
            .publish(event)
            .expect("service accepts events");
        service
            .turn(Some(TURN_TIMEOUT))
            .expect("service turn failed");
        self.settle();
    }

    pub fn last_reply(&self) -> &Value {
        self.replies.last().expect("a reply should have been received")
    }

    pub fn shutdown(&mut self) {
        self.service().shutdown();
    }

    pub fn socket_exists(&self) -> bool {
        self.socket_path().exists()
    }
}

impl Drop for ServiceWorld {
    fn drop(&mut self) {
        self.clients.clear();
        if let Some(mut service) = self.service.take() {
            service.shutdown();
        }
    }
}

/// Provides a fresh world for each scenario.
pub fn world() -> RefCell<ServiceWorld> {
    RefCell::new(ServiceWorld::new())
}
