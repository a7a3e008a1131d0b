//! Payload schemas for every message the server sends.
//!
//! One type per envelope `type`. Field names follow the server's
//! camelCase convention; identifiers use an uppercase `ID` suffix
//! (`playerID`), with the lowercase spelling accepted as an alias.
//!
//! Each type implements [`Inbound`], whose `is_valid` covers what can be
//! checked from the payload alone. Checks that depend on lobby state
//! (round counts against limits, etc.) belong to the lobby engine.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{FillData, GameState, Inbound, LineData, PlayerRecord, WordHint};

fn all_valid(players: &[PlayerRecord]) -> bool {
    players.iter().all(PlayerRecord::is_valid)
}

/// Reads a list that the server may send as `null` when it is empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Full resyncs
// ---------------------------------------------------------------------------

/// `ready`: the complete lobby state, sent once after connecting.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ready {
    #[serde(rename = "playerID", alias = "playerId")]
    pub player_id: String,
    #[serde(rename = "ownerID", alias = "ownerId", default)]
    pub owner_id: String,
    #[serde(default)]
    pub allow_drawing: bool,
    /// Absent on servers that do not report it; the engine then keeps its
    /// current game state.
    #[serde(default)]
    pub game_state: Option<GameState>,
    pub current_round: u32,
    pub current_maximal_round_count: u32,
    /// Milliseconds left in the current turn.
    #[serde(default)]
    pub current_drawing_time: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub word_hints: Vec<WordHint>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub players: Vec<PlayerRecord>,
    /// Tagged elements: `{"type":"line","data":{..}}`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub current_drawing: Vec<Value>,
}

impl Inbound for Ready {
    const TYPE: &'static str = "ready";

    fn is_valid(&self) -> bool {
        !self.player_id.is_empty() && all_valid(&self.players)
    }
}

/// `next-turn`: a new turn began; the drawing is cleared.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextTurn {
    #[serde(alias = "round")]
    pub current_round: u32,
    /// Milliseconds left in the new turn.
    #[serde(default, alias = "roundEndTime")]
    pub current_drawing_time: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub players: Vec<PlayerRecord>,
    #[serde(default)]
    pub previous_word: Option<String>,
}

impl Inbound for NextTurn {
    const TYPE: &'static str = "next-turn";

    fn is_valid(&self) -> bool {
        all_valid(&self.players)
    }
}

/// `drawing`: the whole board, outside of `ready`.
///
/// Flat elements: `{"type":"line","fromX":..}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct Drawing(pub Vec<Value>);

impl Inbound for Drawing {
    const TYPE: &'static str = "drawing";
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// `name-change`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameChange {
    #[serde(rename = "playerID", alias = "playerId")]
    pub player_id: String,
    pub new_name: String,
}

impl Inbound for NameChange {
    const TYPE: &'static str = "name-change";

    fn is_valid(&self) -> bool {
        !self.player_id.is_empty() && !self.new_name.is_empty()
    }
}

/// `update-players`: the complete player list.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct UpdatePlayers(pub Vec<PlayerRecord>);

impl Inbound for UpdatePlayers {
    const TYPE: &'static str = "update-players";

    fn is_valid(&self) -> bool {
        all_valid(&self.0)
    }
}

/// `correct-guess`: the ID of the player who guessed the word.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct CorrectGuess(pub String);

impl Inbound for CorrectGuess {
    const TYPE: &'static str = "correct-guess";

    fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }
}

/// `kick-vote`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KickVote {
    #[serde(rename = "playerID", alias = "playerId")]
    pub player_id: String,
    pub player_name: String,
    pub vote_count: u32,
    pub required_vote_count: u32,
}

impl Inbound for KickVote {
    const TYPE: &'static str = "kick-vote";

    fn is_valid(&self) -> bool {
        !self.player_id.is_empty()
    }
}

/// `drawer-kicked`: carries no data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DrawerKicked {}

impl Inbound for DrawerKicked {
    const TYPE: &'static str = "drawer-kicked";

    fn when_absent() -> Option<Self> {
        Some(Self {})
    }
}

/// `owner-change`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerChange {
    #[serde(rename = "playerID", alias = "playerId")]
    pub player_id: String,
    pub player_name: String,
}

impl Inbound for OwnerChange {
    const TYPE: &'static str = "owner-change";

    fn is_valid(&self) -> bool {
        !self.player_id.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Words and chat
// ---------------------------------------------------------------------------

/// `update-wordhint`: the full hint row.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct UpdateWordHint(pub Vec<WordHint>);

impl Inbound for UpdateWordHint {
    const TYPE: &'static str = "update-wordhint";
}

/// `your-turn`: the words the local player may choose from.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct YourTurn(pub Vec<String>);

impl Inbound for YourTurn {
    const TYPE: &'static str = "your-turn";

    fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }
}

/// `close-guess`: the guess that was nearly right.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct CloseGuess(pub String);

impl Inbound for CloseGuess {
    const TYPE: &'static str = "close-guess";
}

/// A chat line, shared by `message` and `non-guessing-player-message`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatLine {
    pub author: String,
    #[serde(rename = "authorID", alias = "authorId", default)]
    pub author_id: String,
    pub content: String,
}

/// `message`: chat visible to everyone.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ChatMessage(pub ChatLine);

impl Inbound for ChatMessage {
    const TYPE: &'static str = "message";
}

/// `non-guessing-player-message`: chat only visible to players who
/// already guessed (or are drawing).
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct NonGuessingChatMessage(pub ChatLine);

impl Inbound for NonGuessingChatMessage {
    const TYPE: &'static str = "non-guessing-player-message";
}

/// `system-message`
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct SystemMessage(pub String);

impl Inbound for SystemMessage {
    const TYPE: &'static str = "system-message";
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// `line`: one stroke drawn by the current drawer.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct Line(pub LineData);

impl Inbound for Line {
    const TYPE: &'static str = "line";

    fn is_valid(&self) -> bool {
        self.0.line_width.is_finite() && self.0.line_width > f32::EPSILON
    }
}

/// `fill`: one flood fill by the current drawer.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct Fill(pub FillData);

impl Inbound for Fill {
    const TYPE: &'static str = "fill";
}

/// `clear-drawing-board`: carries no data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClearDrawingBoard {}

impl Inbound for ClearDrawingBoard {
    const TYPE: &'static str = "clear-drawing-board";

    fn when_absent() -> Option<Self> {
        Some(Self {})
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// `lobby-settings-changed`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbySettingsChanged {
    pub max_players: u32,
    pub public: bool,
    pub enable_votekick: bool,
    pub custom_words_chance: u32,
    #[serde(default)]
    pub clients_per_ip_limit: Option<u32>,
}

impl Inbound for LobbySettingsChanged {
    const TYPE: &'static str = "lobby-settings-changed";
}
