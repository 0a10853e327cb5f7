//! Errors raised while dispatching, marshalling and verifying calls.
//!
//! None of these are fatal to a session: the dispatcher reports them to the
//! agent as a failed response and keeps serving commands. I/O errors are
//! wrapped in `Arc` to keep the enums small.

use std::sync::Arc;

use camino::Utf8PathBuf;
use halprobe_types::ScalarKind;
use thiserror::Error;

/// A positional argument did not fit the native parameter it feeds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarshalError {
    /// The call supplied the wrong number of arguments.
    #[error("expected {expected} argument(s), got {actual}")]
    Count {
        /// Declared parameter count.
        expected: usize,
        /// Supplied argument count.
        actual: usize,
    },
    /// No argument exists at the requested position.
    #[error("argument {index} is missing")]
    Missing {
        /// Requested position.
        index: usize,
    },
    /// The argument's shape or kind differs from the declared type.
    #[error("argument {index} should be {expected}, got {found}")]
    Kind {
        /// Argument position.
        index: usize,
        /// Declared type.
        expected: String,
        /// Shape or kind actually supplied.
        found: String,
    },
    /// A vector element has the wrong kind.
    #[error("argument {index} element {position} should be {expected}")]
    Element {
        /// Argument position.
        index: usize,
        /// Element position within the vector.
        position: usize,
        /// Declared element kind.
        expected: ScalarKind,
    },
    /// A fixed-size array received the wrong number of elements.
    #[error("argument {index} should hold {expected} element(s), got {actual}")]
    Length {
        /// Argument position.
        index: usize,
        /// Declared length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },
    /// An enum value names no member of its native type.
    #[error("{type_name} has no member with value {value}")]
    UnknownEnumValue {
        /// Enum type name.
        type_name: String,
        /// Rendered underlying value.
        value: String,
    },
}

/// Failure delivering a notification on the callback channel.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// The session was started without a callback endpoint.
    #[error("callback channel is not connected")]
    NotConnected,
    /// No agent callback was registered under this name.
    #[error("no callback registered for '{name}'")]
    Unregistered {
        /// Callback function name.
        name: String,
    },
    /// Connecting to the agent's callback socket failed.
    #[error("failed to connect to callback socket {path}: {source}")]
    Connect {
        /// Callback socket path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
    /// Writing the notification failed.
    #[error("failed to send callback notification: {0}")]
    Send(#[source] Arc<std::io::Error>),
    /// The notification could not be serialised.
    #[error("failed to encode callback notification: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Failure invoking a function or reading an attribute.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The interface exposes no function with this name.
    #[error("function '{name}' not found")]
    NotFound {
        /// Requested function name.
        name: String,
    },
    /// The interface exposes no attribute with this name.
    #[error("attribute '{name}' not found")]
    AttributeNotFound {
        /// Requested attribute name.
        name: String,
    },
    /// The supplied arguments do not match the function's signature.
    #[error("invalid arguments for '{function}': {source}")]
    Arguments {
        /// Function being called.
        function: String,
        /// Marshalling failure.
        #[source]
        source: MarshalError,
    },
    /// The native side reported a failure.
    #[error("driver failure in '{function}': {message}")]
    Driver {
        /// Function being called.
        function: String,
        /// Driver-provided description.
        message: String,
    },
}

impl InvokeError {
    /// Builds an [`InvokeError::Arguments`] for `function`.
    #[must_use]
    pub fn arguments(function: impl Into<String>, source: MarshalError) -> Self {
        Self::Arguments {
            function: function.into(),
            source,
        }
    }

    /// Builds an [`InvokeError::Driver`] for `function`.
    #[must_use]
    pub fn driver(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Driver {
            function: function.into(),
            message: message.into(),
        }
    }
}

/// Actual results did not match the expected ones.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// Expectations name a function the interface does not expose.
    #[error("cannot verify unknown function '{name}'")]
    UnknownFunction {
        /// Function name.
        name: String,
    },
    /// The number of results differs from the number of expectations.
    #[error("expected {expected} result(s), got {actual}")]
    CountMismatch {
        /// Expected result count.
        expected: usize,
        /// Actual result count.
        actual: usize,
    },
    /// The result at `index` differs from its expectation.
    #[error("result {index} does not match the expected value")]
    ValueMismatch {
        /// Result position.
        index: usize,
    },
    /// A result could not be decoded into its native type for comparison.
    #[error("result {index} is not comparable: {source}")]
    Undecodable {
        /// Result position.
        index: usize,
        /// Decoding failure.
        #[source]
        source: MarshalError,
    },
}

/// Failure opening a driver for a loaded component.
#[derive(Debug, Error)]
pub enum DriverError {
    /// No driver is registered for the component identity.
    #[error("no driver registered for {key}")]
    NotRegistered {
        /// Rendered component identity.
        key: String,
    },
    /// A driver is already registered for the component identity.
    #[error("a driver is already registered for {key}")]
    Duplicate {
        /// Rendered component identity.
        key: String,
    },
    /// The driver refused to open the component.
    #[error("driver for {key} failed to open: {message}")]
    Open {
        /// Rendered component identity.
        key: String,
        /// Driver-provided description.
        message: String,
    },
}
