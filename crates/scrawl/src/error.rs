//! Unified error type for the scrawl client.

use scrawl_lobby::LobbyError;
use scrawl_protocol::ProtocolError;
use scrawl_session::SessionError;
use scrawl_transport::TransportError;

/// Any error a scrawl layer can return, so callers need one `?` type.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ScrawlError {
    /// Connection-level failure (connect, send, receive).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Malformed or invalid message or value.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Bootstrap failure, including rejected arguments.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Lobby engine failure (rejected data, sending while disconnected).
    #[error(transparent)]
    Lobby(#[from] LobbyError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err: ScrawlError = TransportError::ConnectionClosed("gone".into()).into();
        assert!(matches!(err, ScrawlError::Transport(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: ScrawlError = ProtocolError::InvalidColor("red".into()).into();
        assert!(matches!(err, ScrawlError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err: ScrawlError = SessionError::InvalidArgument("username".into()).into();
        assert!(matches!(err, ScrawlError::Session(_)));
        assert!(err.to_string().contains("username"));
    }

    #[test]
    fn test_from_lobby_error() {
        let err: ScrawlError = LobbyError::NotConnected.into();
        assert!(matches!(err, ScrawlError::Lobby(_)));
    }
}
