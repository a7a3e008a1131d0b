//! Lobby bootstrap for scrawl.
//!
//! Before a lobby connection can be opened, the client asks the server's
//! HTTP API for a seat: either in an existing lobby (join) or in a new
//! one (create). The answer is a [`LobbyGrant`], which carries everything
//! needed to open the WebSocket and build the lobby engine:
//!
//! - the lobby ID and the WebSocket URL;
//! - the session token (cookie) the upgrade request must present;
//! - the board size and the limits the server enforces.
//!
//! Arguments are validated before any request is made. Network and server
//! failures are logged and reported as "no lobby" (`Ok(None)`), never as
//! errors the caller has to unwrap.

mod bootstrap;
mod config;
mod error;
mod grant;

pub use bootstrap::Bootstrapper;
pub use config::{BootstrapConfig, CreateLobbyParams};
pub use error::SessionError;
pub use grant::{LobbyEntry, LobbyGrant, ServerStats};

/// Name of the cookie that carries the session token.
pub const SESSION_COOKIE: &str = "usersession";
