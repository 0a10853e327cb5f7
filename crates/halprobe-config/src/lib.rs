//! Shared configuration for the `halprobed` driver.
//!
//! Values are layered with [`ortho_config`]: built-in defaults, then an
//! optional configuration file, then `HALPROBE_*` environment variables, then
//! command-line flags. The resolved [`Config`] names the socket the driver
//! listens on, how sessions are isolated, where interface specifications live,
//! and how telemetry is rendered.

mod defaults;
mod modes;
mod socket;

use std::ffi::OsString;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_SERVICE_NAME, DEFAULT_SLOW_CALL_MS, default_isolation,
    default_log_filter, default_log_filter_string, default_log_format, default_service_name,
    default_slow_call_ms, default_socket_endpoint, default_spec_dir,
};
pub use modes::{IsolationMode, LogFormat, ModeParseError};
pub use socket::{SocketEndpoint, SocketParseError, SocketPreparationError};

/// Resolved driver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "HALPROBE")]
pub struct Config {
    /// Socket the connection acceptor binds.
    #[serde(default = "default_socket_endpoint")]
    #[ortho_config(default = default_socket_endpoint())]
    pub daemon_socket: SocketEndpoint,
    /// `tracing` filter expression.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Rendering used for log records.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Directory holding interface specification files.
    #[serde(default = "default_spec_dir")]
    #[ortho_config(default = default_spec_dir())]
    pub spec_dir: Utf8PathBuf,
    /// Session isolation strategy.
    #[serde(default = "default_isolation")]
    #[ortho_config(default = default_isolation())]
    pub isolation: IsolationMode,
    /// Agent endpoint that receives asynchronous callbacks, when any.
    #[serde(default)]
    pub callback_socket: Option<Utf8PathBuf>,
    /// Service instance name used for service-style components.
    #[serde(default = "default_service_name")]
    #[ortho_config(default = default_service_name())]
    pub service_name: String,
    /// Native calls running longer than this many milliseconds are reported.
    #[serde(default = "default_slow_call_ms")]
    #[ortho_config(default = default_slow_call_ms())]
    pub slow_call_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daemon_socket: default_socket_endpoint(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            spec_dir: default_spec_dir(),
            isolation: default_isolation(),
            callback_socket: None,
            service_name: default_service_name(),
            slow_call_ms: default_slow_call_ms(),
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        <Self as OrthoConfig>::load()
    }

    /// Loads configuration from an explicit argument list.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Socket endpoint the driver listens on.
    #[must_use]
    pub fn daemon_socket(&self) -> &SocketEndpoint {
        &self.daemon_socket
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log rendering format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Interface specification directory.
    #[must_use]
    pub fn spec_dir(&self) -> &Utf8Path {
        &self.spec_dir
    }

    /// Session isolation strategy.
    #[must_use]
    pub fn isolation(&self) -> IsolationMode {
        self.isolation
    }

    /// Callback endpoint, when configured.
    #[must_use]
    pub fn callback_socket(&self) -> Option<&Utf8Path> {
        self.callback_socket.as_deref()
    }

    /// Service instance name for service-style components.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Slow native call threshold in milliseconds.
    #[must_use]
    pub fn slow_call_ms(&self) -> u64 {
        self.slow_call_ms
    }
}
