//! `ScrawlClient` builder and the bootstrap → connect → lobby sequence.
//!
//! This is the entry point for joining a lobby. It ties together all the
//! layers: session (HTTP) → transport (WebSocket) → lobby engine.

use std::ops::RangeInclusive;
use std::time::Duration;

use scrawl_lobby::{Lobby, LobbyInit, LobbySettings};
use scrawl_session::{
    BootstrapConfig, Bootstrapper, CreateLobbyParams, LobbyEntry, LobbyGrant, SESSION_COOKIE,
    ServerStats,
};
use scrawl_transport::{Link, LinkConfig, WebSocketConnection};

use crate::ScrawlError;

/// Builder for a [`ScrawlClient`].
///
/// # Example
///
/// ```rust,no_run
/// use scrawl::prelude::*;
///
/// # async fn run() -> Result<(), ScrawlError> {
/// let client = ScrawlClient::builder()
///     .host("scribble.example.com")
///     .secure(true)
///     .build();
/// if let Some(mut lobby) = client.join_lobby("abc123", "Alice").await? {
///     lobby.apply_pending_events();
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScrawlClientBuilder {
    bootstrap: BootstrapConfig,
    link: LinkConfig,
}

impl ScrawlClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server's `host[:port]`.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.bootstrap.host = host.into();
        self
    }

    /// Use `https`/`wss` instead of `http`/`ws`.
    pub fn secure(mut self, secure: bool) -> Self {
        self.bootstrap.secure = secure;
        self
    }

    /// Presents a token from an earlier session.
    pub fn session_token(mut self, token: impl Into<String>) -> Self {
        self.bootstrap.session_token = Some(token.into());
        self
    }

    /// Sets the accepted username length, in characters.
    pub fn username_length(mut self, bounds: RangeInclusive<usize>) -> Self {
        self.bootstrap.username_length = bounds;
        self
    }

    /// Bounds how long closing a lobby waits for its background loops.
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.link.shutdown_timeout = timeout;
        self
    }

    pub fn build(self) -> ScrawlClient {
        ScrawlClient {
            bootstrapper: Bootstrapper::new(self.bootstrap),
            link: self.link,
        }
    }
}

/// Obtains lobbies from a server.
#[derive(Debug, Clone)]
pub struct ScrawlClient {
    bootstrapper: Bootstrapper,
    link: LinkConfig,
}

impl ScrawlClient {
    /// Creates a new builder.
    pub fn builder() -> ScrawlClientBuilder {
        ScrawlClientBuilder::new()
    }

    pub fn bootstrapper(&self) -> &Bootstrapper {
        &self.bootstrapper
    }

    /// Joins a lobby and connects to it.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// Only rejected arguments are errors. A refused join or a failed
    /// connection is logged and returns `Ok(None)`.
    pub async fn join_lobby(
        &self,
        lobby_id: &str,
        username: &str,
    ) -> Result<Option<Lobby>, ScrawlError> {
        let grant = self.bootstrapper.join(lobby_id, username).await?;
        Ok(self.connect_granted(grant).await)
    }

    /// Creates a lobby and connects to it.
    ///
    /// # Errors
    /// Only rejected arguments are errors. A refused create or a failed
    /// connection is logged and returns `Ok(None)`.
    pub async fn create_lobby(
        &self,
        params: &CreateLobbyParams,
    ) -> Result<Option<Lobby>, ScrawlError> {
        let grant = self.bootstrapper.create(params).await?;
        Ok(self.connect_granted(grant).await)
    }

    pub async fn list_lobbies(&self) -> Option<Vec<LobbyEntry>> {
        self.bootstrapper.list_lobbies().await
    }

    pub async fn stats(&self) -> Option<ServerStats> {
        self.bootstrapper.stats().await
    }

    async fn connect_granted(&self, grant: Option<LobbyGrant>) -> Option<Lobby> {
        let grant = grant?;
        match self.connect(grant).await {
            Ok(lobby) => Some(lobby),
            Err(e) => {
                tracing::error!(error = %e, "failed to open lobby connection");
                None
            }
        }
    }

    /// Opens the lobby connection for a grant and starts the engine.
    ///
    /// # Errors
    /// Returns `ScrawlError::Transport` if the WebSocket upgrade fails.
    pub async fn connect(&self, grant: LobbyGrant) -> Result<Lobby, ScrawlError> {
        let cookie = grant
            .session_token
            .as_ref()
            .map(|token| format!("{SESSION_COOKIE}={token}"));
        let conn = WebSocketConnection::connect(&grant.ws_url, cookie.as_deref()).await?;
        let link = Link::open(conn, self.link.clone());
        tracing::info!(lobby_id = %grant.lobby_id, "connected to lobby");
        Ok(Lobby::new(lobby_init(grant), link))
    }
}

fn lobby_init(grant: LobbyGrant) -> LobbyInit {
    let defaults = LobbySettings::default();
    let settings = LobbySettings {
        max_players: grant.max_players.unwrap_or(defaults.max_players),
        public: grant.public.unwrap_or(defaults.public),
        enable_votekick: grant.enable_votekick.unwrap_or(defaults.enable_votekick),
        custom_words_chance: grant.custom_words_chance.unwrap_or(defaults.custom_words_chance),
        clients_per_ip_limit: grant
            .clients_per_ip_limit
            .unwrap_or(defaults.clients_per_ip_limit),
    };
    LobbyInit {
        lobby_id: grant.lobby_id,
        secure: grant.secure,
        limits: grant.limits,
        board_base_width: grant.board_base_width,
        board_base_height: grant.board_base_height,
        settings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrawl_protocol::LobbyLimits;

    fn grant() -> LobbyGrant {
        LobbyGrant {
            lobby_id: "abc123".into(),
            ws_url: "ws://localhost/v1/ws?lobby_id=abc123".into(),
            secure: false,
            session_token: None,
            board_base_width: 800,
            board_base_height: 600,
            limits: LobbyLimits::DEFAULT,
            max_players: Some(8),
            public: None,
            enable_votekick: None,
            custom_words_chance: Some(0),
            clients_per_ip_limit: None,
        }
    }

    #[test]
    fn test_lobby_init_merges_advertised_settings() {
        let init = lobby_init(grant());
        assert_eq!(init.lobby_id, "abc123");
        assert_eq!(init.board_base_width, 800);
        assert_eq!(init.settings.max_players, 8);
        assert_eq!(init.settings.custom_words_chance, 0);
        assert_eq!(init.settings.public, LobbySettings::default().public);
    }

    #[test]
    fn test_builder_sets_config() {
        let client = ScrawlClient::builder()
            .host("example.com:3000")
            .secure(true)
            .session_token("t")
            .username_length(3..=12)
            .shutdown_timeout(Duration::from_millis(250))
            .build();
        let config = client.bootstrapper().config();
        assert_eq!(config.host, "example.com:3000");
        assert!(config.secure);
        assert_eq!(config.session_token.as_deref(), Some("t"));
        assert_eq!(config.username_length, 3..=12);
        assert_eq!(client.link.shutdown_timeout, Duration::from_millis(250));
    }
}
