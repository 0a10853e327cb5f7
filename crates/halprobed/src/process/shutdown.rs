use std::io;
use std::sync::Mutex;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use thiserror::Error;
use tracing::info;

use crate::transport::ExitHook;

use super::PROCESS_TARGET;

/// Why the supervisor stopped waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShutdownCause {
    /// A termination signal arrived.
    Signal(i32),
    /// The accept loop stopped on its own.
    ListenerStopped,
}

/// Abstraction over shutdown notification mechanisms.
pub(crate) trait ShutdownSignal: Send + Sync {
    /// Hook that makes a pending or later [`ShutdownSignal::wait`] return.
    fn waker(&self) -> ExitHook;

    /// Blocks until shutdown should proceed.
    fn wait(&self) -> Result<ShutdownCause, ShutdownError>;
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Another waiter panicked while holding the signal iterator.
    #[error("signal listener state poisoned")]
    Poisoned,
}

/// Shutdown listener that waits for termination signals.
pub(crate) struct SystemShutdownSignal {
    signals: Mutex<Signals>,
    handle: Handle,
}

impl SystemShutdownSignal {
    /// Registers the termination signals; they queue until [`Self::wait`].
    pub(crate) fn install() -> Result<Self, ShutdownError> {
        let signals = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])
            .map_err(|source| ShutdownError::Install { source })?;
        let handle = signals.handle();
        Ok(Self {
            signals: Mutex::new(signals),
            handle,
        })
    }
}

impl ShutdownSignal for SystemShutdownSignal {
    fn waker(&self) -> ExitHook {
        let handle = self.handle.clone();
        Box::new(move || handle.close())
    }

    fn wait(&self) -> Result<ShutdownCause, ShutdownError> {
        let mut signals = self.signals.lock().map_err(|_| ShutdownError::Poisoned)?;
        let cause = signals
            .forever()
            .next()
            .map_or(ShutdownCause::ListenerStopped, ShutdownCause::Signal);
        if let ShutdownCause::Signal(signal) = cause {
            info!(
                target: PROCESS_TARGET,
                signal,
                "shutdown signal received"
            );
        }
        Ok(cause)
    }
}
