//! What can go wrong turning text into messages and values.
//!
//! Each crate in scrawl defines its own error enum. A `ProtocolError`
//! always means the problem is in the shape or content of a message (or
//! of a value object built from one), never in networking or lobby state.

/// A message, value, or limit that does not fit the wire format.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into text).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing required fields,
    /// or wrong data types.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but violates a protocol rule (failed its
    /// validity check, malformed drawing element, etc.).
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The envelope's `type` does not match the decoder it was routed to.
    #[error("expected message type `{expected}`, found `{found}`")]
    TypeMismatch { expected: String, found: String },

    /// Lobby limits were constructed with an inverted range or a minimum
    /// below 1.
    #[error("invalid lobby limits: {0}")]
    InvalidLimits(String),

    /// A draw command was constructed from an invalid combination of
    /// fields (e.g. a line with no width).
    #[error("invalid draw command: {0}")]
    InvalidDrawCommand(String),

    /// A color was not of the form `#RRGGBB`.
    #[error("invalid color `{0}`, expected #RRGGBB")]
    InvalidColor(String),

    /// A language token is neither a known code nor a legacy alias.
    #[error("unknown language `{0}`")]
    UnknownLanguage(String),
}
