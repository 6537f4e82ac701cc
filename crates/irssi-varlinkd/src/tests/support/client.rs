//! Blocking varlink client used by the behavioural suites.

use std::io::{self, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use serde_json::Value;

const READ_TIMEOUT: Duration = Duration::from_secs(2);

/// A connected test client.
#[derive(Debug)]
pub struct TestClient {
    stream: UnixStream,
    buffer: Vec<u8>,
}

impl TestClient {
    pub fn connect(path: &Path) -> Self {
        let stream = UnixStream::connect(path).expect("connect to service socket");
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .expect("set read timeout");
        Self {
            stream,
            buffer: Vec::new(),
        }
    }

    /// Writes raw bytes without adding a terminator.
    pub fn send_raw(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).expect("write to service");
    }

    /// Writes `call` followed by the terminator.
    pub fn send(&mut self, call: &Value) {
        let mut frame = serde_json::to_vec(call).expect("encode call");
        frame.push(0);
        self.send_raw(&frame);
    }

    /// Reads one frame and returns its raw bytes, without the terminator.
    pub fn read_frame_bytes(&mut self) -> Vec<u8> {
        self.try_read_frame_bytes()
            .expect("read frame")
            .expect("service closed the connection before a frame arrived")
    }

    /// Reads one frame and decodes it.
    pub fn read_frame(&mut self) -> Value {
        serde_json::from_slice(&self.read_frame_bytes()).expect("decode frame")
    }

    /// Returns `Ok(None)` on end of stream.
    pub fn try_read_frame_bytes(&mut self) -> io::Result<Option<Vec<u8>>> {
        loop {
            if let Some(position) = self.buffer.iter().position(|byte| *byte == 0) {
                let frame = self.buffer[..position].to_vec();
                self.buffer.drain(..=position);
                return Ok(Some(frame));
            }
            let mut chunk = [0_u8; 4096];
            let read = self.stream.read(&mut chunk)?;
            if read == 0 {
                return Ok(None);
            }
            self.buffer.extend_from_slice(&chunk[..read]);
        }
    }

    /// Returns true when nothing arrives within `timeout`.
    pub fn is_silent_for(&mut self, timeout: Duration) -> bool {
        if !self.buffer.is_empty() {
            return false;
        }
        self.stream
            .set_read_timeout(Some(timeout))
            .expect("set read timeout");
        let mut byte = [0_u8; 1];
        let silent = match self.stream.read(&mut byte) {
            Ok(0) => true,
            Ok(_) => {
                self.buffer.push(byte[0]);
                false
            }
            Err(error) => matches!(
                error.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ),
        };
        self.stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .expect("restore read timeout");
        silent
    }

    /// Returns true once the service has closed its write direction and no
    /// unread frame remains.
    pub fn at_end_of_stream(&mut self) -> bool {
        matches!(self.try_read_frame_bytes(), Ok(None))
    }
}
