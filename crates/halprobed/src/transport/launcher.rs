//! Session isolation strategies.
//!
//! Each accepted connection gets its own session with private state. The
//! fork launcher gives every session its own address space, so a native
//! call that corrupts memory or aborts takes down only its own agent. The
//! thread launcher keeps sessions in-process; each still owns its builder
//! and driver, so nothing mutable is shared between them.

use std::mem;
use std::os::fd::RawFd;
use std::os::unix::net::UnixStream;
use std::process;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use halprobe_config::IsolationMode;
use nix::errno::Errno;
use nix::sys::signal::{SigHandler, Signal, signal};
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, close, fork};
use tracing::{debug, warn};

use crate::session::SessionId;

use super::{ConnectionHandler, LISTENER_TARGET, SpawnError};

/// Starts sessions for accepted connections.
pub(crate) trait SessionLauncher: Send {
    /// Starts serving `stream` and returns without waiting for the session.
    fn launch(
        &mut self,
        session: SessionId,
        stream: UnixStream,
        handler: &Arc<dyn ConnectionHandler>,
    ) -> Result<(), SpawnError>;

    /// Collects sessions that have finished.
    fn reap(&mut self);

    /// Tells the launcher which descriptor accepts connections, so a session
    /// running in its own process can release its copy.
    fn listening_on(&mut self, _listener: RawFd) {}
}

/// Picks the launcher matching the configured isolation mode.
pub(crate) fn launcher_for(mode: IsolationMode) -> Box<dyn SessionLauncher> {
    match mode {
        IsolationMode::Process => Box::new(ForkLauncher::default()),
        IsolationMode::Thread => Box::new(ThreadLauncher::default()),
    }
}

/// Forks one child process per session.
///
/// The fork happens on the acceptor thread while the signal thread is still
/// alive. Only the forking thread exists in the child, so a session must not
/// depend on a lock another daemon thread could hold at fork time.
#[derive(Debug, Default)]
pub(crate) struct ForkLauncher {
    live: usize,
    listener: Option<RawFd>,
}

impl ForkLauncher {
    /// Releases the inherited listening socket in a session child.
    fn close_listener(&self) {
        let Some(listener) = self.listener else {
            return;
        };
        if let Err(error) = close(listener) {
            warn!(
                target: LISTENER_TARGET,
                error = %error,
                "failed to close inherited listener"
            );
        }
    }
}

impl SessionLauncher for ForkLauncher {
    fn launch(
        &mut self,
        session: SessionId,
        stream: UnixStream,
        handler: &Arc<dyn ConnectionHandler>,
    ) -> Result<(), SpawnError> {
        // SAFETY: the child runs only the session on its inherited stream and
        // leaves through `process::exit`, never returning into the acceptor.
        // The listener descriptor it closes is never used again in the child.
        match unsafe { fork() }.map_err(SpawnError::Fork)? {
            ForkResult::Child => {
                restore_default_signals();
                self.close_listener();
                handler.handle(session, stream);
                process::exit(0);
            }
            ForkResult::Parent { child } => {
                // The child owns the connection now.
                drop(stream);
                self.live += 1;
                debug!(
                    target: LISTENER_TARGET,
                    %session,
                    child = child.as_raw(),
                    live = self.live,
                    "session process forked"
                );
                Ok(())
            }
        }
    }

    fn listening_on(&mut self, listener: RawFd) {
        self.listener = Some(listener);
    }

    fn reap(&mut self) {
        while self.live > 0 {
            match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::Exited(child, code)) => {
                    self.live -= 1;
                    debug!(
                        target: LISTENER_TARGET,
                        child = child.as_raw(),
                        code,
                        "session process exited"
                    );
                }
                Ok(WaitStatus::Signaled(child, signal, core_dumped)) => {
                    self.live -= 1;
                    warn!(
                        target: LISTENER_TARGET,
                        child = child.as_raw(),
                        signal = %signal,
                        core_dumped,
                        "session process killed by signal"
                    );
                }
                Ok(_) => break,
                Err(Errno::ECHILD) => {
                    self.live = 0;
                    break;
                }
                Err(error) => {
                    warn!(
                        target: LISTENER_TARGET,
                        error = %error,
                        "failed to reap session processes"
                    );
                    break;
                }
            }
        }
    }
}

/// The daemon's shutdown handlers must not outlive the fork; a session
/// child stops on the default disposition of these signals.
fn restore_default_signals() {
    for sig in [
        Signal::SIGTERM,
        Signal::SIGINT,
        Signal::SIGQUIT,
        Signal::SIGHUP,
    ] {
        // SAFETY: the default disposition installs no handler code.
        if let Err(error) = unsafe { signal(sig, SigHandler::SigDfl) } {
            warn!(
                target: LISTENER_TARGET,
                signal = %sig,
                error = %error,
                "failed to restore default signal disposition"
            );
        }
    }
}

/// Runs each session on its own named thread.
#[derive(Debug, Default)]
pub(crate) struct ThreadLauncher {
    sessions: Vec<JoinHandle<()>>,
}

impl ThreadLauncher {
    /// Number of session threads not yet reaped.
    #[cfg(test)]
    pub(crate) fn running(&self) -> usize {
        self.sessions.len()
    }
}

impl SessionLauncher for ThreadLauncher {
    fn launch(
        &mut self,
        session: SessionId,
        stream: UnixStream,
        handler: &Arc<dyn ConnectionHandler>,
    ) -> Result<(), SpawnError> {
        let handler = Arc::clone(handler);
        let thread = thread::Builder::new()
            .name(format!("session-{session}"))
            .spawn(move || handler.handle(session, stream))
            .map_err(SpawnError::Thread)?;
        self.sessions.push(thread);
        Ok(())
    }

    fn reap(&mut self) {
        let (finished, running): (Vec<_>, Vec<_>) = mem::take(&mut self.sessions)
            .into_iter()
            .partition(JoinHandle::is_finished);
        self.sessions = running;
        for thread in finished {
            let name = thread.thread().name().map(ToOwned::to_owned);
            if thread.join().is_err() {
                warn!(
                    target: LISTENER_TARGET,
                    thread = name.as_deref().unwrap_or("session"),
                    "session thread panicked"
                );
            }
        }
    }
}
