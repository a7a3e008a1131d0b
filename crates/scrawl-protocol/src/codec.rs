//! Codec trait and the JSON implementation.
//!
//! The lobby protocol is JSON over text frames, so the codec works on
//! `str`/`String` rather than bytes.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust values to text and decodes text back.
///
/// - `Send + Sync` → a codec can be shared by the apply step and any task
///   that needs to encode outbound messages.
/// - `'static` → it owns everything it needs.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into text.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes text back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the text is malformed or does
    /// not match the expected shape.
    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON via `serde_json`.
///
/// ```rust
/// use scrawl_protocol::{Codec, JsonCodec, OutboundMessage};
///
/// let text = JsonCodec.encode(&OutboundMessage::KeepAlive).unwrap();
/// assert_eq!(text, r#"{"type":"keep-alive"}"#);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}
