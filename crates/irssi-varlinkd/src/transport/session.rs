//! Per-connection state and the registry that owns it.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Read, Write};
use std::net::Shutdown;
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::net::UnixStream;
use std::time::Duration;

use irssi_varlink_types::{FrameDecoder, FrameError, Reply, encode_frame};

use super::SessionWriteError;

/// Upper bound on a single blocking reply write.
pub(crate) const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

const READ_CHUNK: usize = 4096;

/// Stable identity of a session for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl SessionId {
    /// Numeric value of the identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Whether, and how, a session is waiting for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitMode {
    /// Not subscribed.
    #[default]
    Idle,
    /// Receives the next event, then reverts to [`WaitMode::Idle`].
    Single,
    /// Receives every event with `continues` set.
    Streaming,
}

impl WaitMode {
    /// Mode requested by a `WaitForEvent` call.
    pub const fn for_call(more: bool) -> Self {
        if more { Self::Streaming } else { Self::Single }
    }

    /// Returns true for [`WaitMode::Single`] and [`WaitMode::Streaming`].
    pub const fn is_waiting(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Result of servicing read readiness on a session.
#[derive(Debug)]
pub(crate) enum ReadOutcome {
    /// Zero or more complete frames, in arrival order.
    Frames(Vec<Vec<u8>>),
    /// The peer closed the connection or the read failed.
    Closed,
    /// The peer exceeded the frame size limit.
    Overflow(FrameError),
}

/// One accepted connection.
#[derive(Debug)]
pub(crate) struct Session {
    id: SessionId,
    stream: UnixStream,
    decoder: FrameDecoder,
    mode: WaitMode,
}

impl Session {
    fn new(id: SessionId, stream: UnixStream) -> io::Result<Self> {
        stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
        Ok(Self {
            id,
            stream,
            decoder: FrameDecoder::new(),
            mode: WaitMode::Idle,
        })
    }

    pub(crate) fn id(&self) -> SessionId {
        self.id
    }

    #[cfg(test)]
    pub(crate) fn mode(&self) -> WaitMode {
        self.mode
    }

    pub(crate) fn set_mode(&mut self, mode: WaitMode) {
        self.mode = mode;
    }

    /// Reads the bytes the peer has made available and splits them into
    /// frames.
    pub(crate) fn read_available(&mut self) -> ReadOutcome {
        let mut chunk = [0_u8; READ_CHUNK];
        let read = loop {
            match self.stream.read(&mut chunk) {
                Ok(read) => break read,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                    return ReadOutcome::Frames(Vec::new());
                }
                Err(_) => return ReadOutcome::Closed,
            }
        };
        if read == 0 {
            return ReadOutcome::Closed;
        }
        match self.decoder.feed(&chunk[..read]) {
            Ok(frames) => ReadOutcome::Frames(frames),
            Err(error) => ReadOutcome::Overflow(error),
        }
    }

    /// Encodes `reply` as one frame and writes it out immediately.
    pub(crate) fn write_reply(&mut self, reply: &Reply) -> Result<(), SessionWriteError> {
        let frame = encode_frame(reply)?;
        self.stream.write_all(&frame)?;
        self.stream.flush()?;
        Ok(())
    }

    /// Half-closes the write direction so the peer sees end of stream.
    pub(crate) fn close_write(&self) -> io::Result<()> {
        self.stream.shutdown(Shutdown::Write)
    }
}

impl AsRawFd for Session {
    fn as_raw_fd(&self) -> RawFd {
        self.stream.as_raw_fd()
    }
}

/// Every live session, keyed by identity.
///
/// Iteration follows identifier order, so snapshots are deterministic.
#[derive(Debug, Default)]
pub(crate) struct SessionRegistry {
    sessions: BTreeMap<SessionId, Session>,
    next_id: u64,
}

impl SessionRegistry {
    /// Wraps an accepted stream in a new idle session.
    pub(crate) fn insert(&mut self, stream: UnixStream) -> io::Result<SessionId> {
        let id = SessionId(self.next_id);
        let session = Session::new(id, stream)?;
        self.next_id += 1;
        self.sessions.insert(id, session);
        Ok(id)
    }

    pub(crate) fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: SessionId) -> Option<Session> {
        self.sessions.remove(&id)
    }

    /// Snapshot of the sessions currently waiting for an event.
    pub(crate) fn waiting(&self) -> Vec<(SessionId, WaitMode)> {
        self.sessions
            .values()
            .filter(|session| session.mode.is_waiting())
            .map(|session| (session.id, session.mode))
            .collect()
    }

    /// Removes and returns every session.
    pub(crate) fn drain(&mut self) -> Vec<Session> {
        std::mem::take(&mut self.sessions).into_values().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
