//! Delivery of asynchronous target notifications to the agent.
//!
//! A target reports events by calling back into objects the agent passed as
//! callback-typed arguments. The driver records which agent callback owns
//! each callback function in a [`CallbackRegistry`] and delivers every
//! invocation as one [`CallbackRequest`] over the session's
//! [`CallbackChannel`]. The channel connects, writes a single JSON line and
//! closes for each notification, so the agent needs no persistent state per
//! session.

use std::collections::HashMap;
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use halprobe_types::{CallbackRequest, VariableValue};
use tracing::debug;

use crate::INVOKE_TARGET;
use crate::error::CallbackError;

/// Handle to the agent's callback endpoint, passed into every call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CallbackChannel {
    /// The session has no callback endpoint; notifications are refused.
    #[default]
    Disconnected,
    /// Notifications are sent to a Unix socket at this path.
    Socket(Utf8PathBuf),
}

impl CallbackChannel {
    /// A channel that refuses every notification.
    #[must_use]
    pub const fn disconnected() -> Self {
        Self::Disconnected
    }

    /// A channel bound to the agent socket at `path`.
    #[must_use]
    pub fn socket(path: impl Into<Utf8PathBuf>) -> Self {
        Self::Socket(path.into())
    }

    /// Socket path, when connected.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        match self {
            Self::Disconnected => None,
            Self::Socket(path) => Some(path),
        }
    }

    /// Sends one notification to the agent.
    ///
    /// # Errors
    ///
    /// Returns [`CallbackError::NotConnected`] for a disconnected channel,
    /// or a connect, encode or send failure.
    pub fn notify(&self, request: &CallbackRequest) -> Result<(), CallbackError> {
        let Self::Socket(path) = self else {
            return Err(CallbackError::NotConnected);
        };
        let mut line = serde_json::to_vec(request).map_err(CallbackError::Encode)?;
        line.push(b'\n');
        let mut stream = UnixStream::connect(path).map_err(|source| CallbackError::Connect {
            path: path.clone(),
            source: Arc::new(source),
        })?;
        stream
            .write_all(&line)
            .and_then(|()| stream.flush())
            .map_err(|source| CallbackError::Send(Arc::new(source)))?;
        debug!(
            target: INVOKE_TARGET,
            callback = %request.name,
            id = %request.id,
            "callback delivered"
        );
        Ok(())
    }
}

/// Maps callback function names to the agent callback that owns them.
#[derive(Debug, Clone, Default)]
pub struct CallbackRegistry {
    owners: HashMap<String, String>,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `function` calls back into the agent callback `id`.
    ///
    /// A later registration for the same function replaces the earlier one.
    pub fn register(&mut self, function: impl Into<String>, id: impl Into<String>) {
        self.owners.insert(function.into(), id.into());
    }

    /// Agent callback owning `function`, if registered.
    #[must_use]
    pub fn owner(&self, function: &str) -> Option<&str> {
        self.owners.get(function).map(String::as_str)
    }

    /// Builds the notification for an invocation of `function`.
    ///
    /// # Errors
    ///
    /// Returns [`CallbackError::Unregistered`] when no agent callback owns
    /// `function`.
    pub fn request(
        &self,
        function: &str,
        args: Vec<VariableValue>,
    ) -> Result<CallbackRequest, CallbackError> {
        let id = self
            .owner(function)
            .ok_or_else(|| CallbackError::Unregistered {
                name: function.to_owned(),
            })?;
        Ok(CallbackRequest::new(id, function, args))
    }

    /// Forgets every registration.
    pub fn clear(&mut self) {
        self.owners.clear();
    }
}
