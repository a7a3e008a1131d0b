//! Lobby state and the handlers that mutate it.
//!
//! Every handler follows the same shape: check everything the message
//! claims, and only then write. A message that fails a check returns
//! `LobbyError::Data` and leaves the state exactly as it was.

use std::time::{Duration, Instant};

use scrawl_protocol::inbound::{
    ChatMessage, ClearDrawingBoard, CloseGuess, CorrectGuess, DrawerKicked, Drawing, Fill,
    KickVote, Line, LobbySettingsChanged, NameChange, NextTurn, NonGuessingChatMessage,
    OwnerChange, Ready, SystemMessage, UpdatePlayers, UpdateWordHint, YourTurn,
};
use scrawl_protocol::{
    DrawCommand, DrawingShape, GameState, LobbyLimits, WordHint, decode_drawing,
};

use crate::{LobbyError, LobbyEvent, LobbyInit, LobbySettings, PlayerHandle, PlayerRegistry};

/// Everything the client knows about its lobby.
///
/// Only the apply step writes to it; everything public here is a read.
#[derive(Debug)]
pub struct LobbyState {
    lobby_id: String,
    secure: bool,
    limits: LobbyLimits,
    board_base_width: u32,
    board_base_height: u32,
    settings: LobbySettings,
    game_state: GameState,
    current_round: u32,
    current_max_rounds: u32,
    drawing_deadline: Option<Instant>,
    previous_word: Option<String>,
    word_hints: Vec<WordHint>,
    word_choices: Vec<String>,
    players: PlayerRegistry,
    my_player_id: Option<String>,
    owner_id: Option<String>,
    drawing: Vec<DrawCommand>,
    allow_drawing: bool,
    events: Vec<LobbyEvent>,
}

impl LobbyState {
    pub(crate) fn new(init: LobbyInit) -> Self {
        let min_rounds = *init.limits.round_count().start();
        Self {
            lobby_id: init.lobby_id,
            secure: init.secure,
            current_max_rounds: min_rounds,
            limits: init.limits,
            board_base_width: init.board_base_width,
            board_base_height: init.board_base_height,
            settings: init.settings,
            game_state: GameState::Unstarted,
            current_round: 0,
            drawing_deadline: None,
            previous_word: None,
            word_hints: Vec::new(),
            word_choices: Vec::new(),
            players: PlayerRegistry::new(),
            my_player_id: None,
            owner_id: None,
            drawing: Vec::new(),
            allow_drawing: false,
            events: Vec::new(),
        }
    }

    // -- Accessors --

    pub fn lobby_id(&self) -> &str {
        &self.lobby_id
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn limits(&self) -> &LobbyLimits {
        &self.limits
    }

    /// Width and height of the board the server's coordinates refer to.
    pub fn board_base_size(&self) -> (u32, u32) {
        (self.board_base_width, self.board_base_height)
    }

    pub fn settings(&self) -> &LobbySettings {
        &self.settings
    }

    pub fn game_state(&self) -> GameState {
        self.game_state
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn current_max_rounds(&self) -> u32 {
        self.current_max_rounds
    }

    /// When the current turn ends, if a turn is running.
    pub fn drawing_deadline(&self) -> Option<Instant> {
        self.drawing_deadline
    }

    /// Time left in the current turn; zero once the deadline has passed.
    pub fn remaining_drawing_time(&self) -> Duration {
        self.drawing_deadline
            .map_or(Duration::ZERO, |deadline| {
                deadline.saturating_duration_since(Instant::now())
            })
    }

    pub fn previous_word(&self) -> Option<&str> {
        self.previous_word.as_deref()
    }

    pub fn word_hints(&self) -> &[WordHint] {
        &self.word_hints
    }

    /// Words offered by the last `your-turn`, until the next turn starts.
    pub fn word_choices(&self) -> &[String] {
        &self.word_choices
    }

    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    pub fn player(&self, id: &str) -> Option<&PlayerHandle> {
        self.players.get(id)
    }

    /// The local player, once `ready` has named it.
    pub fn my_player(&self) -> Option<&PlayerHandle> {
        self.my_player_id.as_deref().and_then(|id| self.players.get(id))
    }

    pub fn owner(&self) -> Option<&PlayerHandle> {
        self.owner_id.as_deref().and_then(|id| self.players.get(id))
    }

    /// Returns `true` if the local player owns the lobby.
    pub fn is_owner(&self) -> bool {
        self.my_player_id.is_some() && self.my_player_id == self.owner_id
    }

    /// The board since its last full reset, oldest command first.
    pub fn drawing(&self) -> &[DrawCommand] {
        &self.drawing
    }

    /// Whether the server lets the local player draw right now.
    pub fn allow_drawing(&self) -> bool {
        self.allow_drawing
    }

    /// Queues an event for observers. Custom decoders use this to surface
    /// their own messages.
    pub fn emit(&mut self, event: LobbyEvent) {
        self.events.push(event);
    }

    pub(crate) fn take_events(&mut self) -> Vec<LobbyEvent> {
        std::mem::take(&mut self.events)
    }

    fn deadline_in(millis: u64) -> Option<Instant> {
        Instant::now().checked_add(Duration::from_millis(millis))
    }

    // -- Handlers --

    pub(crate) fn on_ready(&mut self, msg: Ready, _raw: &str) -> Result<(), LobbyError> {
        self.check_rounds(msg.current_round, msg.current_maximal_round_count)?;
        let drawing = decode_drawing(&msg.current_drawing, DrawingShape::Tagged)
            .map_err(|e| LobbyError::Data(e.to_string()))?;

        if let Some(state) = msg.game_state {
            self.game_state = state;
        }
        self.current_round = msg.current_round;
        self.current_max_rounds = msg.current_maximal_round_count;
        self.drawing_deadline = Self::deadline_in(msg.current_drawing_time);
        self.word_hints = msg.word_hints;
        self.players.update_all(&msg.players);
        self.my_player_id = Some(msg.player_id);
        self.owner_id = (!msg.owner_id.is_empty()).then_some(msg.owner_id);
        self.drawing = drawing;
        self.allow_drawing = msg.allow_drawing;

        tracing::info!(
            lobby_id = %self.lobby_id,
            round = self.current_round,
            players = self.players.len(),
            "lobby ready"
        );
        self.emit(LobbyEvent::Ready);
        Ok(())
    }

    pub(crate) fn on_next_turn(&mut self, msg: NextTurn, _raw: &str) -> Result<(), LobbyError> {
        self.allow_drawing = false;
        self.game_state = GameState::Ongoing;
        self.current_round = msg.current_round;
        self.drawing_deadline = Self::deadline_in(msg.current_drawing_time);
        self.players.update_all(&msg.players);
        if let Some(word) = &msg.previous_word {
            self.previous_word = Some(word.clone());
        }
        self.drawing.clear();
        self.word_choices.clear();

        tracing::debug!(lobby_id = %self.lobby_id, round = msg.current_round, "next turn");
        self.emit(LobbyEvent::NextTurn {
            round: msg.current_round,
            previous_word: msg.previous_word,
        });
        Ok(())
    }

    pub(crate) fn on_name_change(&mut self, msg: NameChange, _raw: &str) -> Result<(), LobbyError> {
        if !self.players.rename(&msg.player_id, &msg.new_name) {
            tracing::debug!(player_id = %msg.player_id, "rename for unknown player ignored");
            return Ok(());
        }
        if let Some(player) = self.players.get(&msg.player_id).cloned() {
            self.emit(LobbyEvent::NameChanged {
                player,
                new_name: msg.new_name,
            });
        }
        Ok(())
    }

    pub(crate) fn on_update_players(
        &mut self,
        msg: UpdatePlayers,
        _raw: &str,
    ) -> Result<(), LobbyError> {
        self.players.update_all(&msg.0);
        self.emit(LobbyEvent::PlayersUpdated);
        Ok(())
    }

    pub(crate) fn on_update_word_hint(
        &mut self,
        msg: UpdateWordHint,
        _raw: &str,
    ) -> Result<(), LobbyError> {
        self.word_hints = msg.0;
        self.game_state = GameState::Ongoing;
        self.emit(LobbyEvent::WordHintsUpdated);
        Ok(())
    }

    pub(crate) fn on_message(&mut self, msg: ChatMessage, _raw: &str) -> Result<(), LobbyError> {
        self.emit(LobbyEvent::Chat(msg.0));
        Ok(())
    }

    pub(crate) fn on_non_guessing_message(
        &mut self,
        msg: NonGuessingChatMessage,
        _raw: &str,
    ) -> Result<(), LobbyError> {
        self.emit(LobbyEvent::NonGuessingChat(msg.0));
        Ok(())
    }

    pub(crate) fn on_system_message(
        &mut self,
        msg: SystemMessage,
        _raw: &str,
    ) -> Result<(), LobbyError> {
        self.emit(LobbyEvent::SystemMessage(msg.0));
        Ok(())
    }

    pub(crate) fn on_line(&mut self, msg: Line, _raw: &str) -> Result<(), LobbyError> {
        let command = DrawCommand::try_from(msg.0).map_err(|e| LobbyError::Data(e.to_string()))?;
        self.drawing.push(command);
        self.game_state = GameState::Ongoing;
        self.emit(LobbyEvent::Drawn(command));
        Ok(())
    }

    pub(crate) fn on_fill(&mut self, msg: Fill, _raw: &str) -> Result<(), LobbyError> {
        let command = DrawCommand::try_from(msg.0).map_err(|e| LobbyError::Data(e.to_string()))?;
        self.drawing.push(command);
        self.emit(LobbyEvent::Drawn(command));
        Ok(())
    }

    pub(crate) fn on_clear_drawing_board(
        &mut self,
        _msg: ClearDrawingBoard,
        _raw: &str,
    ) -> Result<(), LobbyError> {
        self.drawing.clear();
        self.emit(LobbyEvent::DrawingCleared);
        Ok(())
    }

    pub(crate) fn on_your_turn(&mut self, msg: YourTurn, _raw: &str) -> Result<(), LobbyError> {
        self.allow_drawing = true;
        self.drawing.clear();
        self.word_choices.clone_from(&msg.0);
        self.emit(LobbyEvent::YourTurn { words: msg.0 });
        Ok(())
    }

    pub(crate) fn on_close_guess(&mut self, msg: CloseGuess, _raw: &str) -> Result<(), LobbyError> {
        self.emit(LobbyEvent::CloseGuess(msg.0));
        Ok(())
    }

    pub(crate) fn on_correct_guess(
        &mut self,
        msg: CorrectGuess,
        _raw: &str,
    ) -> Result<(), LobbyError> {
        let player = self.players.get(&msg.0).cloned();
        self.emit(LobbyEvent::CorrectGuess {
            player_id: msg.0,
            player,
        });
        Ok(())
    }

    pub(crate) fn on_kick_vote(&mut self, msg: KickVote, _raw: &str) -> Result<(), LobbyError> {
        self.players.rename(&msg.player_id, &msg.player_name);
        self.emit(LobbyEvent::KickVote {
            player_id: msg.player_id,
            player_name: msg.player_name,
            vote_count: msg.vote_count,
            required_vote_count: msg.required_vote_count,
        });
        Ok(())
    }

    pub(crate) fn on_drawer_kicked(
        &mut self,
        _msg: DrawerKicked,
        _raw: &str,
    ) -> Result<(), LobbyError> {
        self.emit(LobbyEvent::DrawerKicked);
        Ok(())
    }

    pub(crate) fn on_owner_change(&mut self, msg: OwnerChange, _raw: &str) -> Result<(), LobbyError> {
        self.players.rename(&msg.player_id, &msg.player_name);
        self.owner_id = Some(msg.player_id.clone());
        self.emit(LobbyEvent::OwnerChanged {
            player_id: msg.player_id,
            player_name: msg.player_name,
        });
        Ok(())
    }

    pub(crate) fn on_drawing(&mut self, msg: Drawing, _raw: &str) -> Result<(), LobbyError> {
        self.drawing = decode_drawing(&msg.0, DrawingShape::Flat)
            .map_err(|e| LobbyError::Data(e.to_string()))?;
        self.emit(LobbyEvent::DrawingReplaced);
        Ok(())
    }

    pub(crate) fn on_lobby_settings_changed(
        &mut self,
        msg: LobbySettingsChanged,
        _raw: &str,
    ) -> Result<(), LobbyError> {
        if !self.limits.is_max_player_count_valid(msg.max_players) {
            return Err(LobbyError::Data(format!(
                "max players {} outside {:?}",
                msg.max_players,
                self.limits.max_player_count()
            )));
        }
        if msg.custom_words_chance > LobbySettings::MAX_CUSTOM_WORDS_CHANCE {
            return Err(LobbyError::Data(format!(
                "custom words chance {} above {}",
                msg.custom_words_chance,
                LobbySettings::MAX_CUSTOM_WORDS_CHANCE
            )));
        }
        if let Some(clients) = msg.clients_per_ip_limit {
            if !self.limits.is_clients_per_ip_valid(clients) {
                return Err(LobbyError::Data(format!(
                    "clients per IP {clients} outside {:?}",
                    self.limits.clients_per_ip()
                )));
            }
        }

        self.settings.max_players = msg.max_players;
        self.settings.public = msg.public;
        self.settings.enable_votekick = msg.enable_votekick;
        self.settings.custom_words_chance = msg.custom_words_chance;
        if let Some(clients) = msg.clients_per_ip_limit {
            self.settings.clients_per_ip_limit = clients;
        }
        self.emit(LobbyEvent::SettingsChanged);
        Ok(())
    }

    /// `round <= max_rounds`, and `max_rounds` within the round limits.
    fn check_rounds(&self, round: u32, max_rounds: u32) -> Result<(), LobbyError> {
        if !self.limits.is_round_count_valid(max_rounds) {
            return Err(LobbyError::Data(format!(
                "maximal round count {max_rounds} outside {:?}",
                self.limits.round_count()
            )));
        }
        if round > max_rounds {
            return Err(LobbyError::Data(format!(
                "round {round} exceeds maximal round count {max_rounds}"
            )));
        }
        Ok(())
    }
}
