//! Test doubles shared by the CLI behavioural suite.

use std::ffi::OsString;
use std::io::{Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use irssi_varlink_config::Config;
use irssi_varlink_types::{FrameDecoder, encode_frame};
use serde_json::{Value, json};
use tempfile::TempDir;

use crate::{AppError, ConfigLoader};

pub(crate) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(crate) const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// Canned reply sequences served by [`FakeService`].
pub(crate) fn script(name: &str) -> Vec<Value> {
    match name {
        "info" => vec![json!({ "parameters": {
            "vendor": "irssi-varlink",
            "product": "irssi-varlink",
            "interfaces": ["org.varlink.service", "org.irssi.varlink"]
        }})],
        "nick" => vec![json!({ "parameters": { "nick": "alice" } })],
        "sent" => vec![json!({ "parameters": { "success": true } })],
        "description" => vec![json!({ "parameters": {
            "description": "interface org.irssi.varlink\n"
        }})],
        "server-not-found" => vec![json!({
            "error": "org.irssi.varlink.ServerNotFound",
            "parameters": { "description": "Server not found: ghost", "parameter": "server" }
        })],
        "event-stream" => vec![
            json!({ "parameters": { "event": { "type": "message", "message": "one" } }, "continues": true }),
            json!({ "parameters": { "event": { "type": "message", "message": "two" } }, "continues": true }),
            json!({
                "error": "org.varlink.service.ServiceShutdown",
                "parameters": { "description": "Service is shutting down" }
            }),
        ],
        "silent" => Vec::new(),
        other => panic!("unknown reply script {other}"),
    }
}

/// One-shot varlink service on a Unix socket.
///
/// Accepts a single connection, records the first call it receives, writes
/// the scripted replies, and hangs up.
pub(crate) struct FakeService {
    socket: PathBuf,
    requests: Arc<Mutex<Vec<Value>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl FakeService {
    pub(crate) fn spawn(socket: &Path, replies: Vec<Value>) -> Result<Self> {
        let listener = UnixListener::bind(socket).context("bind fake service")?;
        let requests: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let handle = thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            if let Some(request) = Self::read_call(&mut stream) {
                recorded.lock().expect("lock requests").push(request);
            } else {
                return;
            }
            for reply in &replies {
                let frame = encode_frame(reply).expect("encode reply");
                stream.write_all(&frame).expect("write reply");
            }
            stream.flush().expect("flush replies");
        });
        Ok(Self {
            socket: socket.to_path_buf(),
            requests,
            handle: Some(handle),
        })
    }

    fn read_call(stream: &mut UnixStream) -> Option<Value> {
        let mut decoder = FrameDecoder::new();
        let mut chunk = [0_u8; 512];
        loop {
            let read = stream.read(&mut chunk).ok().filter(|read| *read > 0)?;
            let frames = decoder.feed(&chunk[..read]).expect("call within frame limit");
            if let Some(frame) = frames.into_iter().next() {
                return Some(serde_json::from_slice(&frame).expect("call is json"));
            }
        }
    }

    /// Waits for the service thread and returns the calls it recorded.
    pub(crate) fn finish(&mut self) -> Vec<Value> {
        if let Some(handle) = self.handle.take() {
            // Unblocks `accept` when the client never connected.
            drop(UnixStream::connect(&self.socket));
            handle.join().expect("fake service thread");
        }
        self.requests.lock().expect("lock requests").clone()
    }
}

pub(crate) struct TestWorld {
    directory: TempDir,
    service: Option<FakeService>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    exit_code: Option<ExitCode>,
    requests: Vec<Value>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self {
            directory: tempfile::tempdir().expect("temp dir"),
            service: None,
            stdout: Vec::new(),
            stderr: Vec::new(),
            exit_code: None,
            requests: Vec::new(),
        }
    }
}

impl TestWorld {
    fn socket_path(&self) -> PathBuf {
        self.directory.path().join("varlink.sock")
    }

    pub(crate) fn start_service(&mut self, script_name: &str) -> Result<()> {
        self.service = Some(FakeService::spawn(&self.socket_path(), script(script_name))?);
        Ok(())
    }

    pub(crate) fn run(&mut self, command: &str) {
        self.stdout.clear();
        self.stderr.clear();
        let socket_path =
            Utf8PathBuf::from_path_buf(self.socket_path()).expect("utf-8 socket path");
        let loader = StaticConfigLoader::new(Config {
            socket_path,
            ..Config::default()
        });
        let args = std::iter::once(OsString::from("irssi-varlink"))
            .chain(command.split_whitespace().map(OsString::from));
        let exit = crate::run_with_loader(args, &mut self.stdout, &mut self.stderr, &loader);
        self.exit_code = Some(exit);
        if let Some(service) = self.service.as_mut() {
            self.requests = service.finish();
        }
    }

    pub(crate) fn exit_code(&self) -> ExitCode {
        self.exit_code.expect("exit code recorded")
    }

    pub(crate) fn stdout_text(&self) -> String {
        String::from_utf8(self.stdout.clone()).expect("stdout utf8")
    }

    pub(crate) fn stderr_text(&self) -> String {
        String::from_utf8(self.stderr.clone()).expect("stderr utf8")
    }

    pub(crate) fn requests(&self) -> &[Value] {
        &self.requests
    }

    pub(crate) fn only_request(&self) -> &Value {
        assert_eq!(self.requests.len(), 1, "expected a single call");
        &self.requests[0]
    }
}
