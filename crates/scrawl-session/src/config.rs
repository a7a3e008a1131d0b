//! Bootstrap configuration and lobby-creation parameters.

use std::ops::RangeInclusive;

use scrawl_protocol::{Language, LobbyLimits};

use crate::SessionError;

/// Where and as whom to bootstrap.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// `host[:port]`, without scheme.
    pub host: String,
    /// Use `https`/`wss` instead of `http`/`ws`.
    pub secure: bool,
    /// A token from an earlier session, presented as the session cookie.
    pub session_token: Option<String>,
    /// Accepted username length, in characters.
    pub username_length: RangeInclusive<usize>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            host: "localhost:8080".into(),
            secure: false,
            session_token: None,
            username_length: 1..=30,
        }
    }
}

impl BootstrapConfig {
    pub(crate) fn check_username(&self, username: &str) -> Result<(), SessionError> {
        let length = username.chars().count();
        if !self.username_length.contains(&length) {
            return Err(SessionError::InvalidArgument(format!(
                "username length {length} outside {:?}",
                self.username_length
            )));
        }
        Ok(())
    }
}

/// Everything needed to create a lobby.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLobbyParams {
    pub username: String,
    pub language: Language,
    pub public: bool,
    pub max_players: u32,
    /// Seconds per turn.
    pub drawing_time: u32,
    pub rounds: u32,
    pub custom_words: Vec<String>,
    /// Percentage (0..=100) of turns that use a custom word.
    pub custom_words_chance: u32,
    pub enable_votekick: bool,
    pub clients_per_ip_limit: u32,
}

impl Default for CreateLobbyParams {
    fn default() -> Self {
        Self {
            username: String::new(),
            language: Language::EnglishUs,
            public: false,
            max_players: 24,
            drawing_time: 120,
            rounds: 4,
            custom_words: Vec::new(),
            custom_words_chance: 50,
            enable_votekick: true,
            clients_per_ip_limit: 1,
        }
    }
}

impl CreateLobbyParams {
    pub const MAX_CUSTOM_WORDS_CHANCE: u32 = 100;

    /// Checks every numeric setting against `rules`.
    ///
    /// # Errors
    /// Returns `SessionError::InvalidArgument` naming the first setting
    /// out of range.
    pub fn validate(&self, rules: &LobbyLimits) -> Result<(), SessionError> {
        let out_of_range = |name: &str, value: u32, range: RangeInclusive<u32>| {
            SessionError::InvalidArgument(format!("{name} {value} outside {range:?}"))
        };
        if !rules.is_max_player_count_valid(self.max_players) {
            return Err(out_of_range("max players", self.max_players, rules.max_player_count()));
        }
        if !rules.is_drawing_time_valid(self.drawing_time) {
            return Err(out_of_range("drawing time", self.drawing_time, rules.drawing_time()));
        }
        if !rules.is_round_count_valid(self.rounds) {
            return Err(out_of_range("rounds", self.rounds, rules.round_count()));
        }
        if !rules.is_clients_per_ip_valid(self.clients_per_ip_limit) {
            return Err(out_of_range(
                "clients per IP",
                self.clients_per_ip_limit,
                rules.clients_per_ip(),
            ));
        }
        if self.custom_words_chance > Self::MAX_CUSTOM_WORDS_CHANCE {
            return Err(out_of_range(
                "custom words chance",
                self.custom_words_chance,
                0..=Self::MAX_CUSTOM_WORDS_CHANCE,
            ));
        }
        Ok(())
    }

    /// The form fields sent to `POST /v1/lobby`.
    pub(crate) fn form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("username", self.username.clone()),
            ("language", self.language.wire_name().to_owned()),
            ("public", self.public.to_string()),
            ("max_players", self.max_players.to_string()),
            ("drawing_time", self.drawing_time.to_string()),
            ("rounds", self.rounds.to_string()),
            ("custom_words", self.custom_words.join(",")),
            ("custom_words_chance", self.custom_words_chance.to_string()),
            ("enable_votekick", self.enable_votekick.to_string()),
            ("clients_per_ip_limit", self.clients_per_ip_limit.to_string()),
        ]
    }
}
