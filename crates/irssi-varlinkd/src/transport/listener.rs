//! Unix domain socket listener.

use std::fs;
use std::io;
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::fs::FileTypeExt;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{LISTENER_TARGET, ListenerError};

/// Non-blocking listener bound to a filesystem path.
///
/// The socket file is removed by [`SocketListener::close`].
#[derive(Debug)]
pub(crate) struct SocketListener {
    path: PathBuf,
    listener: UnixListener,
}

impl SocketListener {
    /// Binds `path`, first removing whatever stale file a previous run left
    /// there.
    ///
    /// A socket that still accepts connections is left alone and reported
    /// as [`ListenerError::UnixInUse`].
    pub(crate) fn bind(path: &Path) -> Result<Self, ListenerError> {
        let listener = bind_unix(path)?;
        if let Err(source) = listener.set_nonblocking(true) {
            cleanup_unix_socket(path);
            return Err(ListenerError::NonBlocking { source });
        }
        info!(
            target: LISTENER_TARGET,
            path = %path.display(),
            "socket listener active"
        );
        Ok(Self {
            path: path.to_path_buf(),
            listener,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Accepts one pending connection.
    ///
    /// Returns `Ok(None)` when nothing is pending.
    pub(crate) fn accept(&self) -> io::Result<Option<UnixStream>> {
        match self.listener.accept() {
            Ok((stream, _)) => {
                stream.set_nonblocking(false)?;
                Ok(Some(stream))
            }
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    /// Closes the listener and deletes the socket file.
    pub(crate) fn close(self) {
        let Self { path, listener } = self;
        drop(listener);
        cleanup_unix_socket(&path);
    }
}

impl AsRawFd for SocketListener {
    fn as_raw_fd(&self) -> RawFd {
        self.listener.as_raw_fd()
    }
}

fn bind_unix(path: &Path) -> Result<UnixListener, ListenerError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => Some(metadata),
        Err(error) if error.kind() == io::ErrorKind::NotFound => None,
        Err(source) => {
            return Err(ListenerError::UnixMetadata {
                path: path.display().to_string(),
                source,
            });
        }
    };

    if let Some(metadata) = metadata {
        if metadata.file_type().is_socket() {
            ensure_not_in_use(path)?;
        }
        remove_stale_file(path)?;
    }

    UnixListener::bind(path).map_err(|source| ListenerError::BindUnix {
        path: path.display().to_string(),
        source,
    })
}

fn ensure_not_in_use(path: &Path) -> Result<(), ListenerError> {
    match UnixStream::connect(path) {
        Ok(_stream) => Err(ListenerError::UnixInUse {
            path: path.display().to_string(),
        }),
        Err(error)
            if error.kind() == io::ErrorKind::ConnectionRefused
                || error.kind() == io::ErrorKind::NotFound =>
        {
            Ok(())
        }
        Err(source) => Err(ListenerError::UnixConnect {
            path: path.display().to_string(),
            source,
        }),
    }
}

fn remove_stale_file(path: &Path) -> Result<(), ListenerError> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!(
                target: LISTENER_TARGET,
                path = %path.display(),
                "removed stale socket path"
            );
            Ok(())
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ListenerError::UnixCleanup {
            path: path.display().to_string(),
            source,
        }),
    }
}

fn cleanup_unix_socket(path: &Path) {
    if let Err(error) = fs::remove_file(path)
        && error.kind() != io::ErrorKind::NotFound
    {
        warn!(
            target: LISTENER_TARGET,
            error = %error,
            path = %path.display(),
            "failed to remove unix socket file"
        );
    }
}
