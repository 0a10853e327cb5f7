//! Error types for socket listener operations.

use std::io;

use nix::errno::Errno;
use thiserror::Error;

/// Errors surfaced while binding or running the socket listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The listener could not switch to non-blocking accepts.
    #[error("failed to enable non-blocking listener: {source}")]
    NonBlocking {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Binding the socket path failed.
    #[error("failed to bind unix listener at {path}: {source}")]
    BindUnix {
        /// Socket path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Another daemon is serving the socket path.
    #[error("existing unix socket {path} is already in use")]
    UnixInUse {
        /// Socket path.
        path: String,
    },
    /// The socket path is occupied by something other than a socket.
    #[error("unix socket path {path} is not a socket")]
    UnixNotSocket {
        /// Socket path.
        path: String,
    },
    /// Inspecting an existing socket path failed.
    #[error("failed to read metadata for unix socket {path}: {source}")]
    UnixMetadata {
        /// Socket path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Probing an existing socket failed for a reason other than staleness.
    #[error("failed to connect to existing unix socket {path}: {source}")]
    UnixConnect {
        /// Socket path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// A stale socket file could not be removed.
    #[error("failed to remove stale unix socket {path}: {source}")]
    UnixCleanup {
        /// Socket path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Accepting a connection failed and the acceptor stopped.
    #[error("failed to accept connection: {source}")]
    Accept {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The acceptor thread could not be spawned.
    #[error("failed to spawn listener thread: {source}")]
    ThreadSpawn {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The acceptor thread panicked.
    #[error("listener thread panicked")]
    ThreadPanic,
}

/// Failure to start a session for an accepted connection.
#[derive(Debug, Error)]
pub(crate) enum SpawnError {
    #[error("failed to fork session process: {0}")]
    Fork(#[source] Errno),
    #[error("failed to spawn session thread: {0}")]
    Thread(#[source] io::Error),
}
