//! HTTP calls that obtain a lobby seat.

use reqwest::{Client, RequestBuilder, Response, Url, header};
use scrawl_protocol::{Codec, JsonCodec, LobbyLimits};
use serde::de::DeserializeOwned;

use crate::grant::LobbyResponse;
use crate::{
    BootstrapConfig, CreateLobbyParams, LobbyEntry, LobbyGrant, SESSION_COOKIE, ServerStats,
    SessionError,
};

/// Talks to the server's `/v1` HTTP API.
///
/// ```text
/// POST /v1/lobby/player?lobby_id=<id>   join   → LobbyGrant
/// POST /v1/lobby                        create → LobbyGrant
/// GET  /v1/lobby                        list   → Vec<LobbyEntry>
/// GET  /v1/stats                        stats  → ServerStats
/// ```
#[derive(Debug, Clone)]
pub struct Bootstrapper {
    http: Client,
    config: BootstrapConfig,
    rules: LobbyLimits,
}

impl Bootstrapper {
    pub fn new(config: BootstrapConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Uses an existing HTTP client (proxies, timeouts, ...).
    pub fn with_client(config: BootstrapConfig, http: Client) -> Self {
        Self {
            http,
            config,
            rules: LobbyLimits::DEFAULT,
        }
    }

    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// Joins an existing lobby.
    ///
    /// # Errors
    /// Returns `SessionError::InvalidArgument`, before any request, if the
    /// lobby ID is empty or the username length is out of bounds. Every
    /// other failure is logged and yields `Ok(None)`.
    pub async fn join(
        &self,
        lobby_id: &str,
        username: &str,
    ) -> Result<Option<LobbyGrant>, SessionError> {
        if lobby_id.trim().is_empty() {
            return Err(SessionError::InvalidArgument("lobby id is empty".into()));
        }
        self.config.check_username(username)?;

        let mut url = self.http_url("lobby/player")?;
        url.query_pairs_mut().append_pair("lobby_id", lobby_id);
        let request = self
            .http
            .post(url)
            .form(&[("lobby_id", lobby_id), ("username", username)]);
        Ok(self.obtain(request, "join").await)
    }

    /// Creates a lobby and takes its first seat.
    ///
    /// # Errors
    /// Returns `SessionError::InvalidArgument`, before any request, if the
    /// username or any setting is out of bounds. Every other failure is
    /// logged and yields `Ok(None)`.
    pub async fn create(
        &self,
        params: &CreateLobbyParams,
    ) -> Result<Option<LobbyGrant>, SessionError> {
        self.config.check_username(&params.username)?;
        params.validate(&self.rules)?;

        let url = self.http_url("lobby")?;
        let request = self.http.post(url).form(&params.form());
        Ok(self.obtain(request, "create").await)
    }

    /// Lists public lobbies. `None` if the server could not be asked.
    pub async fn list_lobbies(&self) -> Option<Vec<LobbyEntry>> {
        self.get_json("lobby").await
    }

    /// Server-wide counters. `None` if the server could not be asked.
    pub async fn stats(&self) -> Option<ServerStats> {
        self.get_json("stats").await
    }

    /// URL of the lobby connection for `lobby_id`.
    ///
    /// # Errors
    /// Returns `SessionError::InvalidArgument` if the configured host does
    /// not form a valid URL.
    pub fn ws_url(&self, lobby_id: &str) -> Result<Url, SessionError> {
        let scheme = if self.config.secure { "wss" } else { "ws" };
        let mut url = self.url(scheme, "ws")?;
        url.query_pairs_mut().append_pair("lobby_id", lobby_id);
        Ok(url)
    }

    fn http_url(&self, path: &str) -> Result<Url, SessionError> {
        let scheme = if self.config.secure { "https" } else { "http" };
        self.url(scheme, path)
    }

    fn url(&self, scheme: &str, path: &str) -> Result<Url, SessionError> {
        let host = &self.config.host;
        Url::parse(&format!("{scheme}://{host}/v1/{path}"))
            .map_err(|e| SessionError::InvalidArgument(format!("bad host `{host}`: {e}")))
    }

    fn with_session(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.session_token {
            Some(token) => request.header(header::COOKIE, format!("{SESSION_COOKIE}={token}")),
            None => request,
        }
    }

    async fn obtain(&self, request: RequestBuilder, action: &'static str) -> Option<LobbyGrant> {
        match self.request_grant(request).await {
            Ok(grant) => {
                tracing::info!(lobby_id = %grant.lobby_id, action, "lobby granted");
                Some(grant)
            }
            Err(e) => {
                tracing::error!(host = %self.config.host, action, error = %e, "bootstrap failed");
                None
            }
        }
    }

    async fn request_grant(&self, request: RequestBuilder) -> Result<LobbyGrant, SessionError> {
        let response = check_status(self.with_session(request).send().await?).await?;
        let cookie = response
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .map(|c| c.value().to_owned());
        let body = response.text().await?;

        let parsed: LobbyResponse = JsonCodec
            .decode(&body)
            .map_err(|e| SessionError::MalformedResponse(e.to_string()))?;
        let limits = parsed
            .limits()
            .map_err(|e| SessionError::MalformedResponse(e.to_string()))?;
        let ws_url = self.ws_url(&parsed.lobby_id)?;

        Ok(LobbyGrant {
            ws_url: ws_url.to_string(),
            secure: self.config.secure,
            session_token: cookie.or_else(|| self.config.session_token.clone()),
            board_base_width: parsed.drawing_board_base_width,
            board_base_height: parsed.drawing_board_base_height,
            limits,
            max_players: parsed.max_players,
            public: parsed.public,
            enable_votekick: parsed.enable_votekick,
            custom_words_chance: parsed.custom_words_chance,
            clients_per_ip_limit: parsed.clients_per_ip_limit,
            lobby_id: parsed.lobby_id,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        match self.try_get_json(path).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(host = %self.config.host, path, error = %e, "request failed");
                None
            }
        }
    }

    async fn try_get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SessionError> {
        let url = self.http_url(path)?;
        let response = check_status(self.with_session(self.http.get(url)).send().await?).await?;
        let body = response.text().await?;
        JsonCodec
            .decode(&body)
            .map_err(|e| SessionError::MalformedResponse(e.to_string()))
    }
}

async fn check_status(response: Response) -> Result<Response, SessionError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(SessionError::UnexpectedStatus { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bootstrapper(host: &str, secure: bool) -> Bootstrapper {
        Bootstrapper::new(BootstrapConfig {
            host: host.into(),
            secure,
            ..BootstrapConfig::default()
        })
    }

    #[test]
    fn test_ws_url_follows_security_flag() {
        let plain = bootstrapper("example.com:8080", false);
        assert_eq!(
            plain.ws_url("abc123").unwrap().as_str(),
            "ws://example.com:8080/v1/ws?lobby_id=abc123"
        );
        let secure = bootstrapper("example.com", true);
        assert_eq!(
            secure.ws_url("a b").unwrap().as_str(),
            "wss://example.com/v1/ws?lobby_id=a+b"
        );
    }

    #[tokio::test]
    async fn test_join_rejects_bad_arguments_without_request() {
        // Nothing listens on this port; a request would fail with Ok(None).
        let b = bootstrapper("127.0.0.1:9", false);
        assert!(matches!(b.join("", "Alice").await, Err(SessionError::InvalidArgument(_))));
        assert!(matches!(b.join("abc", "").await, Err(SessionError::InvalidArgument(_))));
        let long = "x".repeat(31);
        assert!(matches!(b.join("abc", &long).await, Err(SessionError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_range_settings() {
        let b = bootstrapper("127.0.0.1:9", false);
        let params = CreateLobbyParams {
            username: "Alice".into(),
            rounds: 99,
            ..CreateLobbyParams::default()
        };
        assert!(matches!(b.create(&params).await, Err(SessionError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_yields_none() {
        let b = bootstrapper("127.0.0.1:9", false);
        assert_eq!(b.join("abc", "Alice").await.unwrap(), None);
        assert!(b.stats().await.is_none());
    }
}
