//! Transport layer for scrawl.
//!
//! Provides the [`Connection`] trait that abstracts over a persistent,
//! text-framed, bidirectional connection to a lobby, and the [`Link`] that
//! drives one connection with two background loops:
//!
//! - the **sender loop** drains the outbound queue and writes one text frame
//!   per message, in enqueue order;
//! - the **receiver loop** reads whole messages, decodes them as UTF-8 and
//!   pushes them onto the inbound queue, in receipt order.
//!
//! The rest of the client only ever touches the two queues and the atomic
//! [`LinkState`].
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket connection via `tokio-tungstenite`

mod error;
mod link;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use link::{Link, LinkConfig, LinkState, LoopbackPeer};
#[cfg(feature = "websocket")]
pub use websocket::WebSocketConnection;

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique number for a connection, used to tell links apart in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Hands out the next unused ID. IDs start at 1 and never repeat
    /// within a process.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link#{}", self.0)
    }
}

/// A single persistent connection that carries text messages.
///
/// `send` and `recv` are called from different background tasks at the
/// same time, so implementations must not serialize one behind the other.
pub trait Connection: Send + Sync + 'static {
    /// Writes one text frame to the remote peer.
    fn send(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Waits for the next whole message. `Ok(None)` means the peer hung up
    /// cleanly.
    fn recv(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, TransportError>> + Send;

    /// Starts the close handshake.
    fn close(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    fn id(&self) -> ConnectionId;
}
