//! Structured health reporting for daemon lifecycle events.

use std::sync::Arc;

use halprobe_config::Config;
use halprobe_types::LoadRequest;

use crate::bootstrap::BootstrapError;
use crate::session::{SessionEnd, SessionId, SessionSummary};
use crate::spec::LoadError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
///
/// Session and component events are raised inside the session that caused
/// them, which is a forked child in process isolation mode.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when a session starts serving its connection.
    fn session_opened(&self, session: SessionId);

    /// Invoked when a session terminates.
    fn session_closed(&self, summary: &SessionSummary);

    /// Invoked after a session loads a target component.
    fn component_loaded(&self, session: SessionId, request: &LoadRequest);

    /// Invoked when a session fails to load a target component.
    fn component_failed(&self, session: SessionId, request: &LoadRequest, error: &LoadError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn session_opened(&self, session: SessionId) {
        (**self).session_opened(session);
    }

    fn session_closed(&self, summary: &SessionSummary) {
        (**self).session_closed(summary);
    }

    fn component_loaded(&self, session: SessionId, request: &LoadRequest) {
        (**self).component_loaded(session, request);
    }

    fn component_failed(&self, session: SessionId, request: &LoadRequest, error: &LoadError) {
        (**self).component_failed(session, request, error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting daemon bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            socket = %config.daemon_socket(),
            spec_dir = %config.spec_dir(),
            isolation = %config.isolation(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "daemon bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "daemon bootstrap failed"
        );
    }

    fn session_opened(&self, session: SessionId) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "session_opened",
            %session,
            pid = std::process::id(),
            "session started"
        );
    }

    fn session_closed(&self, summary: &SessionSummary) {
        match &summary.end {
            SessionEnd::Failed(error) => tracing::warn!(
                target: HEALTH_TARGET,
                event = "session_closed",
                session = %summary.session,
                commands = summary.commands,
                error = %error,
                "session terminated after a transport failure"
            ),
            end => tracing::info!(
                target: HEALTH_TARGET,
                event = "session_closed",
                session = %summary.session,
                commands = summary.commands,
                end = ?end,
                "session terminated"
            ),
        }
    }

    fn component_loaded(&self, session: SessionId, request: &LoadRequest) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "component_loaded",
            %session,
            path = %request.path,
            class = request.class,
            component_type = request.component_type,
            version = ?request.version,
            module = %request.module_name,
            "target component loaded"
        );
    }

    fn component_failed(&self, session: SessionId, request: &LoadRequest, error: &LoadError) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "component_failed",
            %session,
            path = %request.path,
            class = request.class,
            module = %request.module_name,
            error = %error,
            "target component failed to load"
        );
    }
}
