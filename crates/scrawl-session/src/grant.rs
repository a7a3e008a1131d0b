//! What the server hands back from the bootstrap endpoints.

use scrawl_protocol::{LobbyLimits, ProtocolError};
use serde::Deserialize;

/// A seat in a lobby, ready to be connected to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbyGrant {
    pub lobby_id: String,
    /// `ws://` or `wss://` URL of the lobby connection.
    pub ws_url: String,
    pub secure: bool,
    /// Token to present as the session cookie on the upgrade request.
    pub session_token: Option<String>,
    pub board_base_width: u32,
    pub board_base_height: u32,
    /// Server-advertised bounds; the defaults when none were advertised.
    pub limits: LobbyLimits,
    pub max_players: Option<u32>,
    pub public: Option<bool>,
    pub enable_votekick: Option<bool>,
    pub custom_words_chance: Option<u32>,
    pub clients_per_ip_limit: Option<u32>,
}

/// Body of a successful join or create.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LobbyResponse {
    #[serde(rename = "lobbyID", alias = "lobbyId")]
    pub lobby_id: String,
    pub drawing_board_base_width: u32,
    pub drawing_board_base_height: u32,
    #[serde(default)]
    pub min_brush_size: Option<u32>,
    #[serde(default)]
    pub max_brush_size: Option<u32>,
    #[serde(default)]
    pub setting_bounds: Option<SettingBounds>,
    #[serde(default)]
    pub max_players: Option<u32>,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub enable_votekick: Option<bool>,
    #[serde(default)]
    pub custom_words_chance: Option<u32>,
    #[serde(default)]
    pub clients_per_ip_limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SettingBounds {
    pub min_drawing_time: u32,
    pub max_drawing_time: u32,
    pub min_rounds: u32,
    pub max_rounds: u32,
    pub min_max_players: u32,
    pub max_max_players: u32,
    pub min_clients_per_ip_limit: u32,
    pub max_clients_per_ip_limit: u32,
}

impl LobbyResponse {
    /// Limits from the advertised bounds, filling gaps from the defaults.
    pub(crate) fn limits(&self) -> Result<LobbyLimits, ProtocolError> {
        let defaults = LobbyLimits::DEFAULT;
        let brush_size = self.min_brush_size.unwrap_or(*defaults.brush_size().start())
            ..=self.max_brush_size.unwrap_or(*defaults.brush_size().end());
        match &self.setting_bounds {
            Some(b) => LobbyLimits::new(
                b.min_drawing_time..=b.max_drawing_time,
                b.min_rounds..=b.max_rounds,
                b.min_max_players..=b.max_max_players,
                b.min_clients_per_ip_limit..=b.max_clients_per_ip_limit,
                brush_size,
            ),
            None => LobbyLimits::new(
                defaults.drawing_time(),
                defaults.round_count(),
                defaults.max_player_count(),
                defaults.clients_per_ip(),
                brush_size,
            ),
        }
    }
}

/// One row of the public lobby list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LobbyEntry {
    #[serde(alias = "lobbyID")]
    pub lobby_id: String,
    pub wordpack: String,
    pub player_count: u32,
    pub max_players: u32,
    pub round: u32,
    pub rounds: u32,
    /// Seconds per turn.
    pub drawing_time: u32,
    pub custom_words: bool,
    pub votekick: bool,
    pub max_clients_per_ip: u32,
}

/// Server-wide counters from `GET /v1/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerStats {
    pub active_lobby_count: u32,
    pub player_count: u32,
    pub occupied_player_slot_count: u32,
    pub connected_player_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrawl_protocol::{Codec, JsonCodec};

    fn response(body: &str) -> LobbyResponse {
        JsonCodec.decode(body).unwrap()
    }

    #[test]
    fn test_limits_default_without_bounds() {
        let r = response(r#"{"lobbyID":"abc123","drawingBoardBaseWidth":800,"drawingBoardBaseHeight":600}"#);
        assert_eq!(r.lobby_id, "abc123");
        assert_eq!(r.limits().unwrap(), LobbyLimits::DEFAULT);
    }

    #[test]
    fn test_limits_from_advertised_bounds() {
        let r = response(
            r#"{"lobbyId":"x","drawingBoardBaseWidth":1,"drawingBoardBaseHeight":1,
                "minBrushSize":4,"maxBrushSize":16,
                "settingBounds":{"minDrawingTime":30,"maxDrawingTime":90,"minRounds":1,"maxRounds":3,
                "minMaxPlayers":2,"maxMaxPlayers":8,"minClientsPerIpLimit":1,"maxClientsPerIpLimit":2}}"#,
        );
        let limits = r.limits().unwrap();
        assert_eq!(limits.round_count(), 1..=3);
        assert_eq!(limits.brush_size(), 4..=16);
        assert!(!limits.is_drawing_time_valid(91));
    }

    #[test]
    fn test_inverted_advertised_bounds_are_rejected() {
        let r = response(
            r#"{"lobbyID":"x","drawingBoardBaseWidth":1,"drawingBoardBaseHeight":1,
                "minBrushSize":40,"maxBrushSize":16}"#,
        );
        assert!(r.limits().is_err());
    }

    #[test]
    fn test_lobby_entry_tolerates_missing_fields() {
        let entry: LobbyEntry = JsonCodec.decode(r#"{"lobbyId":"l1","playerCount":3}"#).unwrap();
        assert_eq!(entry.lobby_id, "l1");
        assert_eq!(entry.player_count, 3);
        assert_eq!(entry.max_players, 0);
    }
}
