use camino::Utf8PathBuf;
use std::env;

#[cfg(unix)]
use libc::geteuid;

#[cfg(unix)]
use dirs::runtime_dir;

use crate::modes::{IsolationMode, LogFormat};
use crate::socket::SocketEndpoint;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Service instance name used when opening service-style components.
pub const DEFAULT_SERVICE_NAME: &str = "default";

/// Native calls slower than this are reported as stalled.
pub const DEFAULT_SLOW_CALL_MS: u64 = 5_000;

/// Default log filter expression used by the binaries.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default session isolation strategy.
pub fn default_isolation() -> IsolationMode {
    IsolationMode::Process
}

/// Owned service name used by serde defaults.
pub fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_owned()
}

/// Slow-call threshold used by serde defaults.
pub fn default_slow_call_ms() -> u64 {
    DEFAULT_SLOW_CALL_MS
}

/// Computes the default socket endpoint for the driver.
pub fn default_socket_endpoint() -> SocketEndpoint {
    SocketEndpoint::unix(runtime_base().join("halprobed.sock"))
}

/// Directory searched for interface specification files.
pub fn default_spec_dir() -> Utf8PathBuf {
    runtime_base().join("spec")
}

#[cfg(unix)]
fn runtime_base() -> Utf8PathBuf {
    let (mut base, apply_namespace) = match runtime_base_directory() {
        Some(dir) => (dir, false),
        None => (fallback_base_directory(), true),
    };

    base.push("halprobe");
    if apply_namespace {
        base.push(user_namespace());
    }
    base
}

#[cfg(unix)]
fn runtime_base_directory() -> Option<Utf8PathBuf> {
    runtime_dir().and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
}

#[cfg(unix)]
fn fallback_base_directory() -> Utf8PathBuf {
    let candidate = env::temp_dir();
    Utf8PathBuf::from_path_buf(candidate).unwrap_or_else(|_| Utf8PathBuf::from("/tmp"))
}

#[cfg(unix)]
fn user_namespace() -> String {
    let uid = unsafe { geteuid() };
    format!("uid-{uid}")
}

#[cfg(not(unix))]
fn runtime_base() -> Utf8PathBuf {
    let candidate = env::temp_dir();
    let mut base =
        Utf8PathBuf::from_path_buf(candidate).unwrap_or_else(|_| Utf8PathBuf::from("."));
    base.push("halprobe");
    base
}
