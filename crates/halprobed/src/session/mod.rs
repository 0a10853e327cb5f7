//! Per-connection session serving.
//!
//! A session reads one command record per line, dispatches it and writes
//! exactly one response record per command. It stays running until the
//! agent sends `EXIT`, closes its end, or the transport fails.

mod errors;
mod framing;
mod handler;
mod server;

use std::fmt;

pub use self::errors::SessionError;
use self::framing::{ResponseWriter, read_frame};
pub(crate) use self::handler::{SessionConnectionHandler, SessionSettings};
use self::server::SessionServer;
pub use self::server::{SessionEnd, SessionSummary};

const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");

/// Number assigned to an accepted connection, unique within one daemon run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Wraps a raw session number.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw session number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
