//! Events raised while applying inbound messages.

use scrawl_protocol::inbound::ChatLine;
use scrawl_protocol::{DrawCommand, EnvelopeHeader};

use crate::PlayerHandle;

/// Something that changed (or was announced) in the lobby.
///
/// One event per applied message, in the order the messages were
/// received. State has already been updated when an event is raised, so
/// observers can read the lobby for details the event does not carry.
#[derive(Debug, Clone)]
pub enum LobbyEvent {
    /// Full resync finished.
    Ready,
    NextTurn {
        round: u32,
        previous_word: Option<String>,
    },
    NameChanged {
        player: PlayerHandle,
        new_name: String,
    },
    PlayersUpdated,
    WordHintsUpdated,
    Chat(ChatLine),
    /// Chat only visible to players who are not guessing.
    NonGuessingChat(ChatLine),
    SystemMessage(String),
    /// A `line` or `fill` was appended to the drawing.
    Drawn(DrawCommand),
    DrawingCleared,
    /// The whole drawing was replaced by a `drawing` message.
    DrawingReplaced,
    /// The local player is the drawer and must pick one of `words`.
    YourTurn { words: Vec<String> },
    CloseGuess(String),
    CorrectGuess {
        player_id: String,
        /// `None` if the ID is not in the registry.
        player: Option<PlayerHandle>,
    },
    KickVote {
        player_id: String,
        player_name: String,
        vote_count: u32,
        required_vote_count: u32,
    },
    DrawerKicked,
    OwnerChanged {
        player_id: String,
        player_name: String,
    },
    SettingsChanged,
    /// A message whose type no decoder is registered for.
    UnknownMessage { envelope: EnvelopeHeader, raw: String },
}
