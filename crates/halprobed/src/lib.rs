//! The `halprobed` test driver daemon.
//!
//! The daemon listens on a path-addressed Unix socket configured through
//! [`halprobe_config`]. Every accepted connection becomes an isolated
//! session, served in a forked child process by default or in a thread when
//! configured for it. A session reads one command record per line, loads at
//! most one target component at a time through its own specification
//! builder, and answers every command with exactly one response record until
//! the agent sends `EXIT` or disconnects.
//!
//! Startup follows a fixed sequence: load configuration, initialise
//! structured telemetry, prepare the socket directory, bind the listener,
//! then wait for a termination signal or a fatal listener exit. Health
//! reporting hooks emit structured telemetry at each lifecycle stage so
//! operators can correlate failures with sessions and components.
//!
//! Target components are reached through drivers registered in a
//! [`halprobe_invoker::DriverRegistry`] built once at startup; the daemon
//! ships with the in-memory loopback driver registered.

mod bootstrap;
mod dispatch;
mod health;
mod process;
mod session;
mod spec;
mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
    default_registry,
};
pub use dispatch::{FixedStatusProbe, StatusProbe};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{LaunchError, ShutdownError, run_daemon};
pub use session::{SessionEnd, SessionError, SessionId, SessionSummary};
pub use spec::{CallError, LoadError};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;

#[cfg(test)]
mod tests;
