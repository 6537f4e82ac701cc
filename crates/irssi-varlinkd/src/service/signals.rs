//! Termination signals as a readiness source.

use std::io::{self, Read};
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::net::UnixStream;

use signal_hook::SigId;
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::low_level::{self, pipe};

/// Signals that stop the service.
pub(crate) const TERMINATION_SIGNALS: [i32; 4] = [SIGTERM, SIGINT, SIGQUIT, SIGHUP];

/// Self-pipe written by the signal handlers and read by the service loop.
#[derive(Debug)]
pub(crate) struct SignalPipe {
    read: UnixStream,
    registrations: Vec<SigId>,
}

impl SignalPipe {
    /// Installs handlers for [`TERMINATION_SIGNALS`].
    pub(crate) fn install() -> io::Result<Self> {
        let (read, write) = UnixStream::pair()?;
        read.set_nonblocking(true)?;
        write.set_nonblocking(true)?;

        let mut registrations = Vec::with_capacity(TERMINATION_SIGNALS.len());
        for signal in TERMINATION_SIGNALS {
            match write.try_clone().and_then(|end| pipe::register(signal, end)) {
                Ok(id) => registrations.push(id),
                Err(error) => {
                    for id in registrations {
                        low_level::unregister(id);
                    }
                    return Err(error);
                }
            }
        }
        Ok(Self {
            read,
            registrations,
        })
    }

    /// Consumes pending notifications; returns true if any signal arrived.
    pub(crate) fn drain(&mut self) -> bool {
        let mut received = false;
        let mut scratch = [0_u8; 16];
        loop {
            match self.read.read(&mut scratch) {
                Ok(0) => break,
                Ok(_) => received = true,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        received
    }

    /// Removes the handlers installed by [`SignalPipe::install`].
    pub(crate) fn uninstall(self) {
        for id in self.registrations {
            low_level::unregister(id);
        }
    }
}

impl AsRawFd for SignalPipe {
    fn as_raw_fd(&self) -> RawFd {
        self.read.as_raw_fd()
    }
}
