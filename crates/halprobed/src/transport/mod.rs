//! Connection acceptor for the daemon socket.
//!
//! The listener binds the configured Unix endpoint, accepts connections on a
//! background thread and hands each one to a [`SessionLauncher`], which runs
//! the session in a forked child or a dedicated thread.

mod errors;
mod handler;
mod launcher;
mod listener;

pub use self::errors::ListenerError;
pub(crate) use self::errors::SpawnError;
pub(crate) use self::handler::ConnectionHandler;
#[cfg(test)]
pub(crate) use self::launcher::ThreadLauncher;
pub(crate) use self::launcher::{SessionLauncher, launcher_for};
pub(crate) use self::listener::{ExitHook, ListenerHandle, SocketListener};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
