//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::sync::Mutex;

use halprobe_config::Config;
use halprobe_types::LoadRequest;

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;
use crate::session::{SessionEnd, SessionId, SessionSummary};
use crate::spec::LoadError;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    SessionOpened(SessionId),
    SessionClosed { session: SessionId, commands: u64, exited: bool },
    ComponentLoaded { session: SessionId, module: String },
    ComponentFailed { session: SessionId, module: String },
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub(crate) struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    pub(crate) fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn session_opened(&self, session: SessionId) {
        self.record(HealthEvent::SessionOpened(session));
    }

    fn session_closed(&self, summary: &SessionSummary) {
        self.record(HealthEvent::SessionClosed {
            session: summary.session,
            commands: summary.commands,
            exited: matches!(summary.end, SessionEnd::Exited),
        });
    }

    fn component_loaded(&self, session: SessionId, request: &LoadRequest) {
        self.record(HealthEvent::ComponentLoaded {
            session,
            module: request.module_name.clone(),
        });
    }

    fn component_failed(&self, session: SessionId, request: &LoadRequest, _error: &LoadError) {
        self.record(HealthEvent::ComponentFailed {
            session,
            module: request.module_name.clone(),
        });
    }
}
