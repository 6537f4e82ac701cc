//! Cross-thread hand-off into the service loop.
//!
//! Producers push messages onto a channel and write one byte to a socket
//! pair whose read half is registered with the reactor. The loop drains the
//! wake bytes and then the channel, so a burst of sends costs one wake-up.

use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::net::UnixStream;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use thiserror::Error;

use crate::event::{Event, MessageEvent, unix_timestamp};

/// Work queued for the service loop.
#[derive(Debug)]
pub(crate) enum InboxMessage {
    /// Broadcast an event to waiting sessions.
    Publish(Event),
    /// Run the shutdown handshake and leave the loop.
    Stop,
}

/// Raised when the service loop is gone.
#[derive(Debug, Error)]
#[error("the varlink service has stopped")]
pub struct ServiceStopped;

/// Thread-safe handle used by the host to feed the service.
#[derive(Debug, Clone)]
pub struct EventSender {
    queue: Sender<InboxMessage>,
    waker: Arc<UnixStream>,
}

impl EventSender {
    /// Converts a message notification into an event and queues it.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceStopped`] once the service has been dropped.
    pub fn send(&self, message: MessageEvent) -> Result<(), ServiceStopped> {
        self.publish(Event::from_message(message, unix_timestamp()))
    }

    /// Queues an event for broadcast.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceStopped`] once the service has been dropped.
    pub fn publish(&self, event: Event) -> Result<(), ServiceStopped> {
        self.push(InboxMessage::Publish(event))
    }

    /// Asks the service loop to shut down.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceStopped`] once the service has been dropped.
    pub fn stop(&self) -> Result<(), ServiceStopped> {
        self.push(InboxMessage::Stop)
    }

    fn push(&self, message: InboxMessage) -> Result<(), ServiceStopped> {
        self.queue.send(message).map_err(|_| ServiceStopped)?;
        match (&*self.waker).write(&[1]) {
            // A full wake buffer already guarantees a pending wake-up.
            Ok(_) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(()),
            Err(_) => Err(ServiceStopped),
        }
    }
}

/// Receiving half owned by the service loop.
#[derive(Debug)]
pub(crate) struct Inbox {
    queue: Receiver<InboxMessage>,
    wake: UnixStream,
}

impl Inbox {
    /// Consumes pending wake bytes and returns every queued message.
    pub(crate) fn drain(&mut self) -> Vec<InboxMessage> {
        let mut scratch = [0_u8; 64];
        loop {
            match self.wake.read(&mut scratch) {
                Ok(0) => break,
                Ok(_) => continue,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }

        let mut messages = Vec::new();
        loop {
            match self.queue.try_recv() {
                Ok(message) => messages.push(message),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        messages
    }
}

impl AsRawFd for Inbox {
    fn as_raw_fd(&self) -> RawFd {
        self.wake.as_raw_fd()
    }
}

/// Creates a connected sender and inbox.
pub(crate) fn inbox() -> io::Result<(EventSender, Inbox)> {
    let (waker, wake) = UnixStream::pair()?;
    waker.set_nonblocking(true)?;
    wake.set_nonblocking(true)?;
    let (queue, receiver) = mpsc::channel();
    Ok((
        EventSender {
            queue,
            waker: Arc::new(waker),
        },
        Inbox {
            queue: receiver,
            wake,
        },
    ))
}
