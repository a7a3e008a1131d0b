//! Values a lobby is created with.

use scrawl_protocol::LobbyLimits;

/// What the bootstrap step learned about a lobby before connecting.
#[derive(Debug, Clone)]
pub struct LobbyInit {
    pub lobby_id: String,
    /// Whether the connection runs over TLS.
    pub secure: bool,
    pub limits: LobbyLimits,
    /// Size of the board the server's coordinates refer to.
    pub board_base_width: u32,
    pub board_base_height: u32,
    pub settings: LobbySettings,
}

impl LobbyInit {
    pub fn new(lobby_id: impl Into<String>) -> Self {
        Self {
            lobby_id: lobby_id.into(),
            secure: false,
            limits: LobbyLimits::DEFAULT,
            board_base_width: 1600,
            board_base_height: 900,
            settings: LobbySettings::default(),
        }
    }
}

/// The lobby settings the owner can change while the lobby runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbySettings {
    pub max_players: u32,
    pub public: bool,
    pub enable_votekick: bool,
    /// Percentage (0..=100) of turns that use a custom word.
    pub custom_words_chance: u32,
    pub clients_per_ip_limit: u32,
}

impl LobbySettings {
    pub const MAX_CUSTOM_WORDS_CHANCE: u32 = 100;
}

impl Default for LobbySettings {
    fn default() -> Self {
        Self {
            max_players: 24,
            public: false,
            enable_votekick: true,
            custom_words_chance: 50,
            clients_per_ip_limit: 1,
        }
    }
}
