//! Errors that end a session.

use std::io;

use thiserror::Error;

/// Transport or framing failure that terminates a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading from the connection failed.
    #[error("failed to read command: {source}")]
    Read {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// A command line exceeded the frame limit.
    #[error("command exceeds {limit} bytes")]
    FrameTooLarge {
        /// Largest accepted frame in bytes.
        limit: usize,
    },
    /// A frame did not decode as a command record.
    #[error("failed to decode command record: {source}")]
    Decode {
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
    /// A response record could not be serialised.
    #[error("failed to encode response record: {source}")]
    Encode {
        /// Underlying encode error.
        #[source]
        source: serde_json::Error,
    },
    /// Writing a response failed.
    #[error("failed to send response: {source}")]
    Write {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}
