//! Shared fixtures for daemon behaviour tests.

mod client;
mod config_loader;
mod reporter;
mod shutdown;
mod specs;

pub(crate) use self::client::AgentClient;
pub(crate) use self::config_loader::{FailingConfigLoader, TestConfigLoader};
pub(crate) use self::reporter::{HealthEvent, RecordingHealthReporter};
pub(crate) use self::shutdown::TestShutdownSignal;
pub(crate) use self::specs::{loopback_request, write_loopback_spec};
