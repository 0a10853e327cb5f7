//! Text encoding for payloads nested inside command and response records.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Failure to encode or decode a nested payload.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The payload text was empty.
    #[error("payload is empty")]
    Empty,
    /// The payload text did not match the expected schema.
    #[error("malformed payload: {0}")]
    Malformed(#[source] serde_json::Error),
    /// The value could not be rendered as text.
    #[error("failed to encode payload: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Renders a payload as compact JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] when serialisation fails.
pub fn encode_text<T: Serialize>(value: &T) -> Result<String, CodecError> {
    serde_json::to_string(value).map_err(CodecError::Encode)
}

/// Parses a payload from JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Empty`] for blank input and
/// [`CodecError::Malformed`] when the text does not match `T`.
pub fn decode_text<T: DeserializeOwned>(text: &str) -> Result<T, CodecError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CodecError::Empty);
    }
    serde_json::from_str(trimmed).map_err(CodecError::Malformed)
}
