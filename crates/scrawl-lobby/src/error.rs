//! Error types for the lobby layer.

use scrawl_protocol::ProtocolError;

/// Errors that can occur while applying or sending lobby messages.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// A message or value failed protocol-level checks.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A message decoded fine but its content does not fit the lobby
    /// (a round count outside the limits, a malformed drawing element).
    /// Only that message is rejected.
    #[error("rejected message data: {0}")]
    Data(String),

    /// The connection is gone; nothing can be sent any more.
    #[error("lobby is not connected")]
    NotConnected,
}
