//! Shutdown signal triggered by the test itself.

use std::sync::{Arc, Condvar, Mutex};

use signal_hook::consts::signal::SIGTERM;

use crate::process::shutdown::{ShutdownCause, ShutdownError, ShutdownSignal};
use crate::transport::ExitHook;

#[derive(Debug, Default)]
struct State {
    cause: Option<ShutdownCause>,
}

/// Shutdown signal released by [`TestShutdownSignal::trigger`] or by the
/// listener's exit hook.
#[derive(Clone, Default)]
pub(crate) struct TestShutdownSignal {
    inner: Arc<(Mutex<State>, Condvar)>,
}

impl TestShutdownSignal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Releases the waiter as if a termination signal had arrived.
    pub(crate) fn trigger(&self) {
        release(&self.inner, ShutdownCause::Signal(SIGTERM));
    }
}

fn release(inner: &(Mutex<State>, Condvar), cause: ShutdownCause) {
    let (lock, cvar) = inner;
    let mut state = lock.lock().expect("shutdown mutex poisoned");
    state.cause.get_or_insert(cause);
    cvar.notify_all();
}

impl ShutdownSignal for TestShutdownSignal {
    fn waker(&self) -> ExitHook {
        let inner = Arc::clone(&self.inner);
        Box::new(move || release(&inner, ShutdownCause::ListenerStopped))
    }

    fn wait(&self) -> Result<ShutdownCause, ShutdownError> {
        let (lock, cvar) = &*self.inner;
        let mut state = lock.lock().expect("shutdown mutex poisoned");
        loop {
            if let Some(cause) = state.cause {
                return Ok(cause);
            }
            state = cvar.wait(state).expect("shutdown mutex poisoned");
        }
    }
}
