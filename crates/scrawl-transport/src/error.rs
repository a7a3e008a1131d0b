/// Why a lobby connection could not be opened or used.
///
/// Every variant except `Connect` ends the link: there is no reconnect.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP upgrade to a persistent connection failed.
    #[error("upgrade to {url} failed: {reason}")]
    Connect { url: String, reason: String },

    #[error("link closed: {0}")]
    ConnectionClosed(String),

    /// Writing a frame failed.
    #[error("could not write frame: {0}")]
    SendFailed(String),

    /// Reading a frame failed.
    #[error("could not read frame: {0}")]
    ReceiveFailed(String),

    /// The link's background loops are gone.
    #[error("link shut down")]
    Shutdown,
}
