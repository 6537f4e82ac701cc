//! [`Readiness`] on top of `poll(2)`.

use std::collections::BTreeMap;
use std::os::fd::{BorrowedFd, RawFd};
use std::time::Duration;

use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};

use super::{ReactorError, Readiness, Token};

/// Level-triggered readiness over the registered descriptors.
#[derive(Debug, Default)]
pub struct PollReadiness {
    sources: BTreeMap<Token, RawFd>,
}

impl PollReadiness {
    /// Creates an empty registration set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns true when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Readiness for PollReadiness {
    fn register(&mut self, token: Token, fd: RawFd) {
        self.sources.insert(token, fd);
    }

    fn unregister(&mut self, token: Token) {
        self.sources.remove(&token);
    }

    fn wait(&mut self, timeout: Option<Duration>) -> Result<Vec<Token>, ReactorError> {
        let tokens: Vec<Token> = self.sources.keys().copied().collect();
        let mut fds: Vec<PollFd<'_>> = self
            .sources
            .values()
            .map(|&fd| {
                // SAFETY: registrants keep the descriptor open until they
                // unregister it, and `fds` does not outlive this call.
                let fd = unsafe { BorrowedFd::borrow_raw(fd) };
                PollFd::new(fd, PollFlags::POLLIN)
            })
            .collect();

        let timeout = match timeout {
            None => PollTimeout::NONE,
            Some(duration) => PollTimeout::try_from(duration).unwrap_or(PollTimeout::MAX),
        };

        match poll(&mut fds, timeout) {
            Ok(_) => {}
            Err(Errno::EINTR) => return Ok(Vec::new()),
            Err(error) => return Err(ReactorError::Poll(error)),
        }

        let wake = PollFlags::POLLIN | PollFlags::POLLHUP | PollFlags::POLLERR | PollFlags::POLLNVAL;
        Ok(tokens
            .into_iter()
            .zip(fds.iter())
            .filter(|(_, fd)| fd.revents().is_some_and(|events| events.intersects(wake)))
            .map(|(token, _)| token)
            .collect())
    }
}
