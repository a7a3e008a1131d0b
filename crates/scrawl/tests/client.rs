//! End-to-end: bootstrap over HTTP, upgrade to WebSocket, apply messages.
//!
//! A fixture server on localhost answers the bootstrap POST, then accepts
//! the WebSocket upgrade on the same port.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use scrawl::prelude::*;
use scrawl::session::SessionError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

// =========================================================================
// Fixture server
// =========================================================================

const GRANT: &str = r#"{"lobbyID":"abc123","drawingBoardBaseWidth":800,"drawingBoardBaseHeight":600}"#;

const READY: &str = r#"{"type":"ready","data":{"currentRound":1,"currentMaximalRoundCount":3,"currentDrawingTime":60000,"players":[{"id":"p1","name":"Alice","score":0,"state":"standby"}],"playerID":"p1","ownerID":"p1","wordHints":[]}}"#;

/// Reads one HTTP request (headers plus a `Content-Length` body).
async fn read_request(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return;
            }
        }
    }
}

async fn answer_http(listener: &TcpListener, status: &str, body: &str) {
    let (mut stream, _) = listener.accept().await.unwrap();
    read_request(&mut stream).await;
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\
         Set-Cookie: usersession=tok-42; Path=/\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await.unwrap();
    stream.shutdown().await.ok();
}

/// Serves the grant, accepts the upgrade, sends `READY`, and returns the
/// upgrade's cookie plus the first message the client sends.
async fn lobby_server() -> (String, JoinHandle<(Option<String>, String)>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();

    let handle = tokio::spawn(async move {
        answer_http(&listener, "200 OK", GRANT).await;

        let (stream, _) = listener.accept().await.unwrap();
        let seen_cookie = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen_cookie);
        let mut ws = tokio_tungstenite::accept_hdr_async(
            stream,
            move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                *sink.lock().unwrap() = req
                    .headers()
                    .get("cookie")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);
                Ok(resp)
            },
        )
        .await
        .unwrap();

        ws.send(Message::text(READY.to_owned())).await.unwrap();

        let mut first = String::new();
        while let Some(Ok(message)) = ws.next().await {
            if let Message::Text(text) = message {
                first = text.as_str().to_owned();
                break;
            }
        }
        let cookie = seen_cookie.lock().unwrap().clone();
        (cookie, first)
    });

    (host, handle)
}

/// Applies events until `Ready` arrives or a second passes.
async fn wait_for_ready(lobby: &mut Lobby) -> bool {
    for _ in 0..100 {
        if lobby
            .apply_pending_events()
            .iter()
            .any(|e| matches!(e, LobbyEvent::Ready))
        {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_join_lobby_end_to_end() {
    let (host, server) = lobby_server().await;
    let client = ScrawlClient::builder().host(host).build();

    let mut lobby = client
        .join_lobby("abc123", "Alice")
        .await
        .expect("arguments are valid")
        .expect("server grants a seat");

    assert_eq!(lobby.state().lobby_id(), "abc123");
    assert_eq!(lobby.state().board_base_size(), (800, 600));
    assert!(lobby.is_connected());

    assert!(wait_for_ready(&mut lobby).await, "ready should arrive");
    assert_eq!(lobby.state().current_round(), 1);
    assert_eq!(lobby.state().my_player().unwrap().name(), "Alice");
    assert_eq!(lobby.state().game_state(), GameState::Unstarted);

    lobby.send_chat("hello").unwrap();
    let (cookie, first) = server.await.unwrap();
    assert_eq!(cookie.as_deref(), Some("usersession=tok-42"));
    assert_eq!(first, r#"{"type":"message","data":"hello"}"#);

    lobby.close().await;
    assert!(!lobby.is_connected());
    assert_eq!(lobby.link_state(), LinkState::Closed);
}

#[tokio::test]
async fn test_refused_join_yields_none() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    let server = tokio::spawn(async move {
        answer_http(&listener, "404 Not Found", r#"{"error":"no such lobby"}"#).await;
    });

    let client = ScrawlClient::builder().host(host).build();
    assert!(client.join_lobby("missing", "Alice").await.unwrap().is_none());
    server.await.unwrap();
}

#[tokio::test]
async fn test_failed_upgrade_yields_none() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    let server = tokio::spawn(async move {
        answer_http(&listener, "200 OK", GRANT).await;
        // Accept the upgrade attempt and hang up without answering.
        let (stream, _) = listener.accept().await.unwrap();
        drop(stream);
    });

    let client = ScrawlClient::builder().host(host).build();
    assert!(client.join_lobby("abc123", "Alice").await.unwrap().is_none());
    server.await.unwrap();
}

#[tokio::test]
async fn test_invalid_username_is_an_error() {
    let client = ScrawlClient::builder()
        .host("127.0.0.1:9")
        .username_length(2..=8)
        .build();
    let result = client.join_lobby("abc123", "A").await;
    assert!(matches!(
        result,
        Err(ScrawlError::Session(SessionError::InvalidArgument(_)))
    ));
}
