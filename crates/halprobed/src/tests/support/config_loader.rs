//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use camino::Utf8PathBuf;
use halprobe_config::{Config, IsolationMode, SocketEndpoint};
use ortho_config::OrthoError;
use tempfile::TempDir;

use crate::bootstrap::ConfigLoader;

use super::specs::write_loopback_spec;

/// Loader that places the socket and a loopback specification under a
/// temporary directory and serves sessions on threads unless told otherwise.
#[derive(Clone)]
pub(crate) struct TestConfigLoader {
    _dir: Arc<TempDir>,
    root: Utf8PathBuf,
    isolation: IsolationMode,
}

impl TestConfigLoader {
    pub(crate) fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temporary directory for socket");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .expect("temporary directory path was not valid UTF-8");
        let loader = Self {
            _dir: Arc::new(dir),
            root,
            isolation: IsolationMode::Thread,
        };
        write_loopback_spec(&loader.spec_dir());
        loader
    }

    pub(crate) const fn with_isolation(mut self, isolation: IsolationMode) -> Self {
        self.isolation = isolation;
        self
    }

    pub(crate) fn socket_path(&self) -> Utf8PathBuf {
        self.root.join("halprobed.sock")
    }

    pub(crate) fn spec_dir(&self) -> Utf8PathBuf {
        self.root.join("specs")
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            daemon_socket: SocketEndpoint::unix(self.socket_path()),
            spec_dir: self.spec_dir(),
            isolation: self.isolation,
            ..Config::default()
        })
    }
}

/// Loader that fails by passing a network socket address on the command line.
pub(crate) struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("halprobed"),
            OsString::from("--daemon-socket"),
            OsString::from("tcp://127.0.0.1:9000"),
        ];
        Config::load_from_iter(args)
    }
}
