//! Supervises daemon launch sequencing and runtime orchestration.

use std::sync::Arc;

use halprobe_invoker::DriverRegistry;
use tracing::info;

use crate::StructuredHealthReporter;
use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with, default_registry};
use crate::dispatch::{FixedStatusProbe, StatusProbe};
use crate::health::HealthReporter;
use crate::session::{SessionConnectionHandler, SessionSettings};
use crate::transport::{SocketListener, launcher_for};

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Process-level collaborators needed to control daemon lifecycle.
pub(crate) struct ProcessControl<S> {
    pub(crate) shutdown: S,
}

/// Service dependencies required to construct the daemon runtime.
pub(crate) struct ServiceDeps<L> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) registry: DriverRegistry,
    pub(crate) status: Arc<dyn StatusProbe>,
}

/// Collaborators required to launch the daemon runtime.
pub(crate) struct LaunchPlan<L, S> {
    pub(crate) process: ProcessControl<S>,
    pub(crate) services: ServiceDeps<L>,
}

/// Runs the daemon using the production collaborators.
///
/// Termination signals are registered before anything else so one arriving
/// during startup still stops the daemon once it is serving.
///
/// # Errors
///
/// Returns [`LaunchError`] when startup fails or the listener stops with an
/// error.
pub fn run_daemon() -> Result<(), LaunchError> {
    let shutdown = SystemShutdownSignal::install()?;
    let plan = LaunchPlan {
        process: ProcessControl { shutdown },
        services: ServiceDeps {
            loader: SystemConfigLoader,
            reporter: Arc::new(StructuredHealthReporter::new()),
            registry: default_registry()?,
            status: Arc::new(FixedStatusProbe::default()),
        },
    };
    run_daemon_with(plan)
}

/// Runs the daemon with injected collaborators.
pub(crate) fn run_daemon_with<L, S>(plan: LaunchPlan<L, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan { process, services } = plan;
    let ProcessControl { shutdown } = process;
    let ServiceDeps {
        loader,
        reporter,
        registry,
        status,
    } = services;

    let daemon = bootstrap_with(&loader, reporter, registry)?;
    let config = daemon.config();
    info!(
        target: PROCESS_TARGET,
        isolation = %config.isolation(),
        drivers = daemon.registry().len(),
        "starting daemon runtime"
    );
    let listener = SocketListener::bind(config.daemon_socket())?;
    let handler = Arc::new(SessionConnectionHandler::new(
        SessionSettings::from_config(config),
        daemon.registry(),
        daemon.reporter(),
    )
    .with_status_probe(status));
    let listener_handle = listener.start(
        launcher_for(config.isolation()),
        handler,
        Some(shutdown.waker()),
    )?;
    let cause = shutdown.wait()?;
    info!(
        target: PROCESS_TARGET,
        ?cause,
        "stopping daemon runtime"
    );
    listener_handle.shutdown();
    listener_handle.join()?;
    info!(
        target: PROCESS_TARGET,
        "shutdown sequence completed"
    );
    Ok(())
}
