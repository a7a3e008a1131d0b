//! Integration tests for the WebSocket link.
//!
//! Each test runs a real WebSocket server on an OS-assigned port and
//! drives a client `Link` against it.

#[cfg(feature = "websocket")]
mod websocket {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use scrawl_transport::{Link, LinkConfig, LinkState, WebSocketConnection};
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::tungstenite::handshake::server::{
        ErrorResponse, Request, Response,
    };

    type ServerWs = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

    /// Binds a listener and returns it with its `ws://` URL.
    async fn bind() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("should have addr");
        (listener, format!("ws://{addr}/v1/ws?lobby_id=test"))
    }

    /// Accepts one upgrade and records the `Cookie` header it carried.
    async fn accept(
        listener: &TcpListener,
        seen_cookie: Arc<Mutex<Option<String>>>,
    ) -> ServerWs {
        let (stream, _) = listener.accept().await.expect("should accept");
        tokio_tungstenite::accept_hdr_async(
            stream,
            move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                let cookie = req
                    .headers()
                    .get("cookie")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);
                *seen_cookie.lock().unwrap() = cookie;
                Ok(resp)
            },
        )
        .await
        .expect("upgrade should succeed")
    }

    /// Polls the link until `count` messages arrived or a second passed.
    async fn collect(link: &mut Link, count: usize) -> Vec<String> {
        let mut out = Vec::new();
        for _ in 0..100 {
            out.extend(link.drain());
            if out.len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        out
    }

    #[tokio::test]
    async fn test_link_carries_cookie_and_preserves_order() {
        let (listener, url) = bind().await;
        let seen_cookie = Arc::new(Mutex::new(None));

        let server_cookie = Arc::clone(&seen_cookie);
        let server = tokio::spawn(async move {
            let mut ws = accept(&listener, server_cookie).await;
            for text in ["first", "second", "third"] {
                ws.send(Message::text(text.to_owned())).await.unwrap();
            }
            // Echo back the first client message, then wait for close.
            let mut received = Vec::new();
            while let Some(Ok(msg)) = ws.next().await {
                match msg {
                    Message::Text(text) => received.push(text.as_str().to_owned()),
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            received
        });

        let conn = WebSocketConnection::connect(&url, Some("usersession=abc"))
            .await
            .expect("client should connect");
        let mut link = Link::open(conn, LinkConfig::default());

        let inbound = collect(&mut link, 3).await;
        assert_eq!(inbound, vec!["first", "second", "third"]);

        link.send("one".into()).unwrap();
        link.send("two".into()).unwrap();
        link.close().await;
        assert_eq!(link.state(), LinkState::Closed);

        let outbound = server.await.expect("server task should finish");
        assert_eq!(outbound, vec!["one", "two"]);
        assert_eq!(
            seen_cookie.lock().unwrap().as_deref(),
            Some("usersession=abc")
        );
    }

    #[tokio::test]
    async fn test_link_reports_closed_when_peer_goes_away() {
        let (listener, url) = bind().await;
        let server = tokio::spawn(async move {
            let mut ws = accept(&listener, Arc::new(Mutex::new(None))).await;
            ws.send(Message::text("bye".to_owned())).await.unwrap();
            ws.close(None).await.unwrap();
        });

        let conn = WebSocketConnection::connect(&url, None)
            .await
            .expect("client should connect");
        let mut link = Link::open(conn, LinkConfig::default());
        server.await.unwrap();

        let inbound = collect(&mut link, 1).await;
        assert_eq!(inbound, vec!["bye"]);

        for _ in 0..100 {
            if link.state() == LinkState::Closed {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(link.state(), LinkState::Closed);
        assert!(link.send("too late".into()).is_err());
    }

    #[tokio::test]
    async fn test_connect_to_missing_server_fails() {
        let (listener, url) = bind().await;
        drop(listener);

        let result = WebSocketConnection::connect(&url, None).await;
        assert!(result.is_err());
    }
}
