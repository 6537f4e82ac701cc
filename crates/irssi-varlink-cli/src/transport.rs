//! Socket transport for the irssi varlink client.
//!
//! [`connect`] opens the service socket with a bounded connect timeout and
//! wraps it in a [`Connection`], which writes framed calls and hands back
//! decoded replies one at a time.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::os::fd::OwnedFd;
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use camino::Utf8Path;
use irssi_varlink_types::{CallRequest, FrameDecoder, Reply, encode_frame};
use socket2::{Domain, SockAddr, Socket, Type};

use crate::AppError;

pub(crate) const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);
const READ_CHUNK: usize = 4096;

/// An open conversation with the service.
pub(crate) struct Connection<S = UnixStream> {
    stream: S,
    decoder: FrameDecoder,
    ready: VecDeque<Vec<u8>>,
}

pub(crate) fn connect(socket: &Utf8Path) -> Result<Connection, AppError> {
    connect_unix(socket.as_std_path())
        .map(Connection::new)
        .map_err(|source| AppError::Connect {
            socket: socket.to_owned(),
            source,
        })
}

fn connect_unix(path: &Path) -> io::Result<UnixStream> {
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
    let address = SockAddr::unix(path)?;
    socket.connect_timeout(&address, CONNECTION_TIMEOUT)?;
    Ok(UnixStream::from(OwnedFd::from(socket)))
}

impl<S> Connection<S>
where
    S: Read + Write,
{
    pub(crate) fn new(stream: S) -> Self {
        Self {
            stream,
            decoder: FrameDecoder::new(),
            ready: VecDeque::new(),
        }
    }

    pub(crate) fn send(&mut self, call: &CallRequest) -> Result<(), AppError> {
        let frame = encode_frame(call).map_err(AppError::EncodeCall)?;
        self.stream.write_all(&frame).map_err(AppError::SendCall)?;
        self.stream.flush().map_err(AppError::SendCall)
    }

    /// Returns the next reply, or `None` once the service has closed the
    /// connection.
    pub(crate) fn next_reply(&mut self) -> Result<Option<Reply>, AppError> {
        loop {
            if let Some(frame) = self.ready.pop_front() {
                return serde_json::from_slice(&frame)
                    .map(Some)
                    .map_err(AppError::ParseReply);
            }

            let mut chunk = [0_u8; READ_CHUNK];
            let read = match self.stream.read(&mut chunk) {
                Ok(0) if self.decoder.pending().is_empty() => return Ok(None),
                Ok(0) => return Err(AppError::TruncatedReply),
                Ok(read) => read,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(AppError::ReadReply(error)),
            };
            let frames = self
                .decoder
                .feed(chunk.get(..read).unwrap_or_default())
                .map_err(AppError::OversizedReply)?;
            self.ready.extend(frames);
        }
    }
}
