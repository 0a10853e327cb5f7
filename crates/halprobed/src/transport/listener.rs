//! Listener implementation for the daemon socket.

use std::fs;
use std::io;
use std::os::fd::AsRawFd;
use std::os::unix::fs::FileTypeExt;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use halprobe_config::SocketEndpoint;
use tracing::{debug, error, info, warn};

use crate::session::SessionId;

use super::{ConnectionHandler, LISTENER_TARGET, ListenerError, SessionLauncher};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);

/// Callback run once the accept loop has stopped, for whatever reason.
pub(crate) type ExitHook = Box<dyn FnOnce() + Send>;

/// Listener bound to the daemon's Unix socket.
#[derive(Debug)]
pub(crate) struct SocketListener {
    endpoint: SocketEndpoint,
    listener: UnixListener,
}

impl SocketListener {
    /// Binds `endpoint`, replacing a stale socket file left by a previous run.
    pub(crate) fn bind(endpoint: &SocketEndpoint) -> Result<Self, ListenerError> {
        let listener = bind_unix(endpoint.path().as_std_path())?;
        Ok(Self {
            endpoint: endpoint.clone(),
            listener,
        })
    }

    /// Starts the accept loop on a background thread.
    ///
    /// Every accepted connection is numbered and passed to `launcher`. The
    /// socket file is removed when the loop stops, after which `on_exit`
    /// runs.
    pub(crate) fn start(
        self,
        mut launcher: Box<dyn SessionLauncher>,
        handler: Arc<dyn ConnectionHandler>,
        on_exit: Option<ExitHook>,
    ) -> Result<ListenerHandle, ListenerError> {
        if let Err(source) = self.listener.set_nonblocking(true) {
            cleanup_unix_socket(&self.endpoint);
            return Err(ListenerError::NonBlocking { source });
        }
        launcher.listening_on(self.listener.as_raw_fd());
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);
        let handle = thread::Builder::new()
            .name("acceptor".to_owned())
            .spawn(move || {
                let outcome = run_accept_loop(&self, &shutdown_flag, launcher, &handler);
                cleanup_unix_socket(&self.endpoint);
                if let Some(hook) = on_exit {
                    hook();
                }
                outcome
            })
            .map_err(|source| ListenerError::ThreadSpawn { source })?;
        Ok(ListenerHandle {
            shutdown,
            handle: Some(handle),
        })
    }
}

/// Handle to the background accept loop.
pub(crate) struct ListenerHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<Result<(), ListenerError>>>,
}

impl ListenerHandle {
    /// Asks the accept loop to stop at its next poll.
    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once the accept loop has returned.
    #[cfg(test)]
    pub(crate) fn is_finished(&self) -> bool {
        self.handle
            .as_ref()
            .is_none_or(thread::JoinHandle::is_finished)
    }

    /// Waits for the accept loop and surfaces the error that stopped it.
    pub(crate) fn join(mut self) -> Result<(), ListenerError> {
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or(Err(ListenerError::ThreadPanic)),
            None => Ok(()),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

fn run_accept_loop(
    listener: &SocketListener,
    shutdown: &AtomicBool,
    mut launcher: Box<dyn SessionLauncher>,
    handler: &Arc<dyn ConnectionHandler>,
) -> Result<(), ListenerError> {
    info!(
        target: LISTENER_TARGET,
        endpoint = %listener.endpoint,
        "socket listener active"
    );
    let mut accepted = 0_u64;
    while !shutdown.load(Ordering::SeqCst) {
        launcher.reap();
        match listener.listener.accept() {
            Ok((stream, _)) => {
                accepted += 1;
                let session = SessionId::new(accepted);
                launch_session(launcher.as_mut(), session, stream, handler);
            }
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_BACKOFF);
            }
            Err(error) if is_transient(&error) => {
                debug!(
                    target: LISTENER_TARGET,
                    error = %error,
                    "transient accept failure"
                );
            }
            Err(source) => {
                error!(
                    target: LISTENER_TARGET,
                    error = %source,
                    "socket accept failed; listener stopping"
                );
                return Err(ListenerError::Accept { source });
            }
        }
    }
    info!(
        target: LISTENER_TARGET,
        accepted,
        "socket listener stopped"
    );
    Ok(())
}

fn launch_session(
    launcher: &mut dyn SessionLauncher,
    session: SessionId,
    stream: UnixStream,
    handler: &Arc<dyn ConnectionHandler>,
) {
    // Accepted sockets inherit non-blocking mode from the listener.
    if let Err(error) = stream.set_nonblocking(false) {
        warn!(
            target: LISTENER_TARGET,
            %session,
            error = %error,
            "dropping connection that cannot block"
        );
        return;
    }
    if let Err(error) = launcher.launch(session, stream, handler) {
        warn!(
            target: LISTENER_TARGET,
            %session,
            error = %error,
            "failed to start session"
        );
    }
}

fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::ConnectionAborted
    )
}

fn bind_unix(path: &Path) -> Result<UnixListener, ListenerError> {
    if path.exists() {
        let metadata =
            fs::symlink_metadata(path).map_err(|source| ListenerError::UnixMetadata {
                path: path.display().to_string(),
                source,
            })?;
        if !metadata.file_type().is_socket() {
            return Err(ListenerError::UnixNotSocket {
                path: path.display().to_string(),
            });
        }
        match UnixStream::connect(path) {
            Ok(_stream) => {
                return Err(ListenerError::UnixInUse {
                    path: path.display().to_string(),
                });
            }
            Err(error)
                if error.kind() == io::ErrorKind::ConnectionRefused
                    || error.kind() == io::ErrorKind::NotFound =>
            {
                fs::remove_file(path).map_err(|source| ListenerError::UnixCleanup {
                    path: path.display().to_string(),
                    source,
                })?;
            }
            Err(error) => {
                return Err(ListenerError::UnixConnect {
                    path: path.display().to_string(),
                    source: error,
                });
            }
        }
    }

    UnixListener::bind(path).map_err(|source| ListenerError::BindUnix {
        path: path.display().to_string(),
        source,
    })
}

fn cleanup_unix_socket(endpoint: &SocketEndpoint) {
    if let Err(error) = fs::remove_file(endpoint.path().as_std_path())
        && error.kind() != io::ErrorKind::NotFound
    {
        warn!(
            target: LISTENER_TARGET,
            error = %error,
            path = %endpoint.path(),
            "failed to remove unix socket file"
        );
    }
}
