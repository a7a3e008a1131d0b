//! # scrawl
//!
//! Client for real-time drawing-and-guessing lobbies.
//!
//! scrawl obtains a seat in a lobby over HTTP, opens the lobby's WebSocket
//! connection, and keeps a local model of the game (players, round, word
//! hints, drawing) that the host application advances on its own cadence.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scrawl::prelude::*;
//!
//! # async fn run() -> Result<(), ScrawlError> {
//! let client = ScrawlClient::builder().host("localhost:8080").build();
//! let Some(mut lobby) = client.join_lobby("abc123", "Alice").await? else {
//!     return Ok(()); // the server said no, or the connection failed
//! };
//! lobby.subscribe(|event| println!("{event:?}"));
//! loop {
//!     lobby.apply_pending_events();
//!     if !lobby.is_connected() {
//!         break;
//!     }
//!     tokio::time::sleep(std::time::Duration::from_millis(50)).await;
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::{ScrawlClient, ScrawlClientBuilder};
pub use error::ScrawlError;

pub use scrawl_lobby as lobby;
pub use scrawl_protocol as protocol;
pub use scrawl_session as session;
pub use scrawl_transport as transport;

pub mod prelude {
    pub use crate::{ScrawlClient, ScrawlClientBuilder, ScrawlError};
    pub use scrawl_lobby::{
        Lobby, LobbyError, LobbyEvent, LobbySettings, LobbyState, Player, PlayerHandle,
    };
    pub use scrawl_protocol::{
        DrawCommand, DrawKind, GameState, Language, LobbyLimits, PlayerState, Point, Rgb,
        WordHint,
    };
    pub use scrawl_session::{CreateLobbyParams, LobbyEntry, ServerStats};
    pub use scrawl_transport::LinkState;
}
