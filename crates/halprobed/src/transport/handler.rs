//! Connection handler abstraction used by the socket listener.

use std::os::unix::net::UnixStream;

use crate::session::SessionId;

/// Serves one accepted connection to completion.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Runs the session for `stream`; returns once the session terminates.
    fn handle(&self, session: SessionId, stream: UnixStream);
}
