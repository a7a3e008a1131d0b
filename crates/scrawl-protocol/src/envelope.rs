//! The `{"type": .., "data": ..}` envelope every message travels in.

use std::fmt;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Just the discriminator of a message.
///
/// Decoding only the header is how a message gets routed before its
/// payload shape is known; unknown fields (including `data`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeHeader {
    #[serde(rename = "type")]
    pub kind: String,
}

/// A full inbound message with its payload decoded as `T`.
///
/// `data` is optional on the wire: some messages (`clear-drawing-board`,
/// `drawer-kicked`) carry none.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "type")]
    pub kind: String,
    // A plain `default` would demand `T: Default`.
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T: Inbound> Envelope<T> {
    /// The payload, falling back to [`Inbound::when_absent`] if the
    /// envelope carried no `data`.
    pub fn into_payload(self) -> Option<T> {
        self.data.or_else(T::when_absent)
    }
}

/// An inbound payload schema.
///
/// Each server message type has one implementor, bound to its wire name
/// by `TYPE`. Decoding a payload is only half the check; `is_valid` is the
/// other half, rejecting values that parsed but cannot be used.
pub trait Inbound: DeserializeOwned + fmt::Debug + Send + 'static {
    /// The envelope `type` this payload belongs to.
    const TYPE: &'static str;

    fn is_valid(&self) -> bool {
        true
    }

    /// The payload to use when the envelope has no `data` at all.
    /// `None` means such an envelope is malformed.
    fn when_absent() -> Option<Self> {
        None
    }
}
