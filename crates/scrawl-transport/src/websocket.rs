//! WebSocket connection implementation using `tokio-tungstenite`.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderValue, header};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::{Connection, ConnectionId, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A client-side WebSocket connection to a lobby.
///
/// The stream is split so that the sender loop and the receiver loop
/// each lock only their own half.
pub struct WebSocketConnection {
    id: ConnectionId,
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl WebSocketConnection {
    /// Upgrades to a WebSocket at `url`, sending `cookie` verbatim as the
    /// `Cookie` header of the upgrade request when present.
    pub async fn connect(
        url: &str,
        cookie: Option<&str>,
    ) -> Result<Self, TransportError> {
        let failed = |reason: String| TransportError::Connect {
            url: url.to_owned(),
            reason,
        };
        let mut request = url
            .into_client_request()
            .map_err(|e| failed(e.to_string()))?;
        if let Some(cookie) = cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| failed(format!("cookie: {e}")))?;
            request.headers_mut().insert(header::COOKIE, value);
        }

        let (ws, response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| failed(e.to_string()))?;

        let conn = Self::from_stream(ws);
        tracing::debug!(
            id = %conn.id,
            url,
            status = %response.status(),
            "WebSocket upgrade complete"
        );
        Ok(conn)
    }

    /// Wraps an already upgraded stream.
    pub fn from_stream(ws: WsStream) -> Self {
        let id = ConnectionId::next();
        let (sink, stream) = ws.split();
        Self {
            id,
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        }
    }
}

impl Connection for WebSocketConnection {
    async fn send(&self, text: &str) -> Result<(), TransportError> {
        self.sink
            .lock()
            .await
            .send(Message::text(text.to_owned()))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // ping/pong/raw frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(e.to_string()));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.sink
            .lock()
            .await
            .close()
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
