//! Player and game-state values as the server reports them.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// What a player is currently doing in the round.
///
/// Tokens the client does not recognise decode as `Unknown`, which makes
/// the enclosing [`PlayerRecord`] invalid. A record that omits the field
/// decodes as `Guessing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayerState {
    #[default]
    Guessing,
    Drawing,
    Standby,
    #[serde(other)]
    Unknown,
}

/// Whether the lobby's game has started.
///
/// There is no terminal state: a finished lobby is disposed rather than
/// moved into an "over" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameState {
    #[default]
    Unstarted,
    Ongoing,
    #[serde(other)]
    Unknown,
}

// ---------------------------------------------------------------------------
// PlayerRecord
// ---------------------------------------------------------------------------

/// One entry of a player list, exactly as it arrives on the wire.
///
/// The lobby engine folds these into long-lived player handles; this type
/// is only the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default = "connected_by_default")]
    pub connected: bool,
    #[serde(default)]
    pub last_score: i64,
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub state: PlayerState,
}

fn connected_by_default() -> bool {
    true
}

impl PlayerRecord {
    /// A record needs an ID to be keyed by and a recognised state.
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && self.state != PlayerState::Unknown
    }
}

// ---------------------------------------------------------------------------
// WordHint
// ---------------------------------------------------------------------------

/// One character slot of the word being guessed.
///
/// `character` is `'\0'` while the slot is hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "WordHintRecord", into = "WordHintRecord")]
pub struct WordHint {
    pub character: char,
    pub underline: bool,
}

impl WordHint {
    pub const HIDDEN: char = '\0';

    pub fn is_hidden(&self) -> bool {
        self.character == Self::HIDDEN
    }
}

/// Wire form: the character is sent as a code point, `0` when hidden.
/// A one-character string is accepted too.
#[derive(Serialize, Deserialize)]
struct WordHintRecord {
    #[serde(default)]
    character: CharRepr,
    #[serde(default)]
    underline: bool,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CharRepr {
    Code(u32),
    Text(String),
}

impl Default for CharRepr {
    fn default() -> Self {
        CharRepr::Code(0)
    }
}

impl TryFrom<WordHintRecord> for WordHint {
    type Error = String;

    fn try_from(record: WordHintRecord) -> Result<Self, Self::Error> {
        let character = match record.character {
            CharRepr::Code(code) => {
                char::from_u32(code).ok_or_else(|| format!("invalid code point {code}"))?
            }
            CharRepr::Text(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (None, _) => WordHint::HIDDEN,
                    (Some(c), None) => c,
                    _ => return Err(format!("word hint `{text}` is not a single character")),
                }
            }
        };
        Ok(WordHint { character, underline: record.underline })
    }
}

impl From<WordHint> for WordHintRecord {
    fn from(hint: WordHint) -> Self {
        WordHintRecord {
            character: CharRepr::Code(u32::from(hint.character)),
            underline: hint.underline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_defaults_missing_fields() {
        let record: PlayerRecord =
            serde_json::from_str(r#"{"id":"p1","name":"Alice"}"#).unwrap();
        assert_eq!(record.score, 0);
        assert!(record.connected);
        assert_eq!(record.state, PlayerState::Guessing);
        assert!(record.is_valid());
    }

    #[test]
    fn test_record_with_unrecognised_state_is_invalid() {
        let record: PlayerRecord =
            serde_json::from_str(r#"{"id":"p1","name":"Alice","state":"spectating"}"#).unwrap();
        assert_eq!(record.state, PlayerState::Unknown);
        assert!(!record.is_valid());
    }

    #[test]
    fn test_game_state_tokens() {
        assert_eq!(serde_json::to_string(&GameState::Ongoing).unwrap(), r#""ongoing""#);
        let state: GameState = serde_json::from_str(r#""unstarted""#).unwrap();
        assert_eq!(state, GameState::Unstarted);
        let state: GameState = serde_json::from_str(r#""gameOver""#).unwrap();
        assert_eq!(state, GameState::Unknown);
    }

    #[test]
    fn test_word_hint_hidden_and_revealed() {
        let hints: Vec<WordHint> = serde_json::from_str(
            r#"[{"character":0,"underline":true},{"character":97,"underline":false},{"character":"b"}]"#,
        )
        .unwrap();
        assert!(hints[0].is_hidden());
        assert!(hints[0].underline);
        assert_eq!(hints[1].character, 'a');
        assert_eq!(hints[2].character, 'b');
    }

    #[test]
    fn test_word_hint_rejects_surrogate_code_point() {
        let result: Result<WordHint, _> = serde_json::from_str(r#"{"character":55296}"#);
        assert!(result.is_err());
    }
}
