//! JSON codec boundary.
//!
//! All structural (de)serialization flows through these helpers so that
//! the rest of the crate never touches `serde_json` directly. Errors keep
//! the originating parse error as their cause; nothing is coerced to a
//! default value.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Encode a value as a JSON byte buffer.
pub fn to_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(value).map_err(CodecError::Encode)
}

/// Decode a JSON byte buffer into a declared type.
pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(bytes).map_err(CodecError::Decode)
}

/// Decode a JSON byte buffer into a generic value.
///
/// An empty (or whitespace-only) body decodes to [`Value::Null`]; replies
/// to verbs like DELETE commonly have no body at all.
pub fn from_bytes_value(bytes: &[u8]) -> Result<Value, CodecError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(CodecError::Decode)
}
