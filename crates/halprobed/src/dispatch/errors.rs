//! Failures answered with a `FAIL` response.

use halprobe_invoker::InvokeError;
use halprobe_types::CodecError;
use thiserror::Error;

use crate::spec::CallError;

/// Why a command was answered with `FAIL`.
#[derive(Debug, Error)]
pub(crate) enum DispatchError {
    #[error("malformed function call description: {0}")]
    MalformedCall(#[source] CodecError),
    #[error("no target component is loaded")]
    NothingLoaded,
    #[error("function call failed: {0}")]
    Invoke(#[source] InvokeError),
    #[error("failed to serialise response payload: {0}")]
    Encode(#[source] CodecError),
}

impl From<CallError> for DispatchError {
    fn from(error: CallError) -> Self {
        match error {
            CallError::NothingLoaded => Self::NothingLoaded,
            CallError::Invoke(source) => Self::Invoke(source),
        }
    }
}
