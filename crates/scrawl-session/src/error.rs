//! Error types for the bootstrap layer.

/// Errors that can occur while obtaining a lobby.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// An argument failed client-side validation. No request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("unexpected status: {status} body={body}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The server's answer could not be understood.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
