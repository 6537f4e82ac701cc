//! Process-level tests for the `irssi-varlinkd` binary.

use std::io::{Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tempfile::TempDir;

const STARTUP_DEADLINE: Duration = Duration::from_secs(10);

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn socket(&self) -> PathBuf {
        self.dir.path().join("run").join("varlink.sock")
    }

    fn command(&self) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_irssi-varlinkd"));
        command
            .env_clear()
            .env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env("IRSSI_VARLINK_LOG_FILTER", "warn")
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        command
    }
}

#[fixture]
fn sandbox() -> Sandbox {
    Sandbox {
        dir: tempfile::tempdir().expect("temp dir"),
    }
}

fn wait_for_socket(path: &Path, child: &mut Child) {
    let deadline = Instant::now() + STARTUP_DEADLINE;
    while !path.exists() {
        if let Some(status) = child.try_wait().expect("poll child") {
            panic!("daemon exited early with {status}");
        }
        assert!(Instant::now() < deadline, "socket never appeared");
        thread::sleep(Duration::from_millis(20));
    }
}

/// A leftover file exists before the daemon binds, so wait for a listener.
fn connect_when_listening(path: &Path, child: &mut Child) -> UnixStream {
    let deadline = Instant::now() + STARTUP_DEADLINE;
    loop {
        if let Ok(stream) = UnixStream::connect(path) {
            return stream;
        }
        if let Some(status) = child.try_wait().expect("poll child") {
            panic!("daemon exited early with {status}");
        }
        assert!(Instant::now() < deadline, "daemon never started listening");
        thread::sleep(Duration::from_millis(20));
    }
}

fn read_frame(stream: &mut UnixStream) -> Option<Value> {
    let mut bytes = Vec::new();
    let mut byte = [0_u8; 1];
    loop {
        match stream.read(&mut byte).expect("read from daemon") {
            0 => return None,
            _ if byte[0] == 0 => break,
            _ => bytes.push(byte[0]),
        }
    }
    Some(serde_json::from_slice(&bytes).expect("decode frame"))
}

fn call(stream: &mut UnixStream, request: &Value) -> Value {
    let mut frame = serde_json::to_vec(request).expect("encode");
    frame.push(0);
    stream.write_all(&frame).expect("write call");
    read_frame(stream).expect("reply")
}

#[rstest]
fn serves_configured_servers_and_stops_on_sigterm(sandbox: Sandbox) {
    let socket = sandbox.socket();
    let mut child = sandbox
        .command()
        .arg("--socket-path")
        .arg(&socket)
        .arg("--servers")
        .arg("libera=alice")
        .spawn()
        .expect("spawn daemon");
    wait_for_socket(&socket, &mut child);

    let mut stream = UnixStream::connect(&socket).expect("connect");
    stream
        .set_read_timeout(Some(STARTUP_DEADLINE))
        .expect("read timeout");
    let reply = call(
        &mut stream,
        &json!({
            "method": "org.irssi.varlink.GetServerNick",
            "parameters": { "server": "libera" },
        }),
    );
    assert_eq!(reply["parameters"]["nick"], "alice");

    let pid = Pid::from_raw(i32::try_from(child.id()).expect("pid fits in i32"));
    kill(pid, Signal::SIGTERM).expect("signal daemon");

    let shutdown = read_frame(&mut stream).expect("shutdown error");
    assert_eq!(shutdown["error"], "org.varlink.service.ServiceShutdown");
    assert!(read_frame(&mut stream).is_none(), "expected end of stream");

    let status = child.wait().expect("wait for daemon");
    assert!(status.success(), "daemon exited with {status}");
    assert!(!socket.exists(), "socket should be removed");
}

#[rstest]
fn replaces_a_leftover_regular_file(sandbox: Sandbox) {
    let socket = sandbox.socket();
    std::fs::create_dir_all(socket.parent().expect("parent")).expect("create dir");
    std::fs::write(&socket, b"leftover").expect("write file");

    let mut child = sandbox
        .command()
        .arg("--socket-path")
        .arg(&socket)
        .spawn()
        .expect("spawn daemon");
    let mut stream = connect_when_listening(&socket, &mut child);
    stream
        .set_read_timeout(Some(STARTUP_DEADLINE))
        .expect("read timeout");
    let reply = call(&mut stream, &json!({ "method": "org.varlink.service.GetInfo" }));
    assert_eq!(reply["parameters"]["vendor"], "irssi-varlink");

    let pid = Pid::from_raw(i32::try_from(child.id()).expect("pid fits in i32"));
    kill(pid, Signal::SIGTERM).expect("signal daemon");
    let status = child.wait().expect("wait for daemon");
    assert!(status.success(), "daemon exited with {status}");
    assert!(!socket.exists(), "socket should be removed");
}

#[rstest]
fn refuses_to_take_over_a_live_socket(sandbox: Sandbox) {
    let socket = sandbox.socket();
    std::fs::create_dir_all(socket.parent().expect("parent")).expect("create dir");
    let _owner = UnixListener::bind(&socket).expect("bind live socket");

    let output = sandbox
        .command()
        .arg("--socket-path")
        .arg(&socket)
        .output()
        .expect("run daemon");

    assert_eq!(output.status.code(), Some(1));
    assert!(socket.exists(), "the live socket must be left alone");
}
