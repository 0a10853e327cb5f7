//! Connection handler that serves agent sessions.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::sync::Arc;
use std::time::Duration;

use halprobe_config::Config;
use halprobe_invoker::DriverRegistry;
use tracing::warn;

use crate::dispatch::{CommandDispatcher, FixedStatusProbe, StatusProbe};
use crate::health::HealthReporter;
use crate::spec::{BuilderSettings, ComponentSpecificationBuilder};
use crate::transport::ConnectionHandler;

use super::{SESSION_TARGET, SessionId, SessionServer, SessionSummary};

/// Settings every session of a daemon run shares.
#[derive(Debug, Clone)]
pub(crate) struct SessionSettings {
    pub(crate) builder: BuilderSettings,
    pub(crate) slow_call: Duration,
}

impl SessionSettings {
    pub(crate) fn from_config(config: &Config) -> Self {
        Self {
            builder: BuilderSettings::from_config(config),
            slow_call: Duration::from_millis(config.slow_call_ms()),
        }
    }
}

/// Builds a fresh builder and dispatcher for every connection.
pub(crate) struct SessionConnectionHandler {
    settings: SessionSettings,
    registry: Arc<DriverRegistry>,
    reporter: Arc<dyn HealthReporter>,
    status: Arc<dyn StatusProbe>,
}

impl SessionConnectionHandler {
    pub(crate) fn new(
        settings: SessionSettings,
        registry: Arc<DriverRegistry>,
        reporter: Arc<dyn HealthReporter>,
    ) -> Self {
        Self {
            settings,
            registry,
            reporter,
            status: Arc::new(FixedStatusProbe::default()),
        }
    }

    /// Replaces the probe answering `GET_STATUS` in every session.
    pub(crate) fn with_status_probe(mut self, status: Arc<dyn StatusProbe>) -> Self {
        self.status = status;
        self
    }

    /// Serves one session over an arbitrary reader and writer pair.
    pub(crate) fn serve<R: BufRead, W: Write>(
        &self,
        session: SessionId,
        reader: R,
        writer: W,
    ) -> SessionSummary {
        let builder = ComponentSpecificationBuilder::new(
            self.settings.builder.clone(),
            Arc::clone(&self.registry),
        );
        let dispatcher = CommandDispatcher::new(session, builder, Arc::clone(&self.reporter))
            .with_status_probe(Arc::clone(&self.status))
            .with_slow_call_threshold(self.settings.slow_call);
        self.reporter.session_opened(session);
        let summary = SessionServer::new(session, dispatcher).run(reader, writer);
        self.reporter.session_closed(&summary);
        summary
    }
}

impl ConnectionHandler for SessionConnectionHandler {
    fn handle(&self, session: SessionId, stream: UnixStream) {
        let reader = match stream.try_clone() {
            Ok(reader) => BufReader::new(reader),
            Err(error) => {
                warn!(
                    target: SESSION_TARGET,
                    %session,
                    error = %error,
                    "failed to clone session stream"
                );
                return;
            }
        };
        let _summary = self.serve(session, reader, stream);
    }
}
