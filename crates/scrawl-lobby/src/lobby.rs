//! The lobby engine: owns the link, the parser registry, and the state.

use scrawl_protocol::{Codec, DrawCommand, Inbound, JsonCodec, OutboundMessage};
use scrawl_transport::{Link, LinkState};

use crate::registry::{Decoder, Dispatch, ParseFailure, ParserRegistry};
use crate::{LobbyError, LobbyEvent, LobbyInit, LobbyState};

/// Identifies a subscribed observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&LobbyEvent) + Send>;

/// A connected lobby.
///
/// Messages from the server queue up in the background and change
/// nothing until the host calls [`apply_pending_events`]. That call is the
/// only place lobby state is written, so the host decides when state
/// moves (typically once per frame or tick).
///
/// ```text
///   receiver loop ──▶ inbound queue ──▶ apply_pending_events ──▶ state + events
///   send_chat, draw, .. ──▶ outbound queue ──▶ sender loop
/// ```
///
/// [`apply_pending_events`]: Lobby::apply_pending_events
pub struct Lobby {
    state: LobbyState,
    registry: ParserRegistry<LobbyState>,
    link: Link,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
}

impl Lobby {
    /// Creates the engine for an already opened link and registers a
    /// decoder for every message type the server sends.
    pub fn new(init: LobbyInit, link: Link) -> Self {
        Self {
            state: LobbyState::new(init),
            registry: builtin_registry(),
            link,
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    pub fn state(&self) -> &LobbyState {
        &self.state
    }

    /// The decoders used by [`apply_pending_events`](Self::apply_pending_events).
    ///
    /// Extra decoders registered here run after the built-in ones for the
    /// same type; registering one for a type the client does not know
    /// stops that type from being reported as unknown.
    pub fn registry_mut(&mut self) -> &mut ParserRegistry<LobbyState> {
        &mut self.registry
    }

    /// Calls `observer` with every event raised from now on, in order.
    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&LobbyEvent) + Send + 'static,
    {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(o, _)| *o != id);
        self.observers.len() != before
    }

    pub fn link_state(&self) -> LinkState {
        self.link.state()
    }

    /// Returns `false` once the connection has failed or been closed.
    /// There is no reconnect: a disconnected lobby is finished.
    pub fn is_connected(&self) -> bool {
        self.link.is_open()
    }

    /// Applies every message received since the last call, oldest first.
    ///
    /// Each message is routed through the parser registry; rejected
    /// messages are logged and skipped without affecting the rest. Events
    /// are handed to observers as they are raised and also returned.
    ///
    /// Never blocks.
    pub fn apply_pending_events(&mut self) -> Vec<LobbyEvent> {
        let pending: Vec<String> = self.link.drain().collect();
        let mut raised = Vec::new();

        for raw in pending {
            match self.registry.dispatch(&mut self.state, &raw) {
                Ok(Dispatch::Routed { .. }) => {}
                Ok(Dispatch::Unknown(envelope)) => {
                    tracing::debug!(msg_type = %envelope.kind, "unknown message type");
                    self.state.emit(LobbyEvent::UnknownMessage { envelope, raw });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "dropping message without envelope");
                }
            }

            for event in self.state.take_events() {
                for (_, observer) in &mut self.observers {
                    observer(&event);
                }
                raised.push(event);
            }
        }

        raised
    }

    // -- Sending --

    fn send(&self, message: OutboundMessage) -> Result<(), LobbyError> {
        if !self.link.is_open() {
            return Err(LobbyError::NotConnected);
        }
        let text = JsonCodec.encode(&message)?;
        self.link.send(text).map_err(|_| LobbyError::NotConnected)?;
        tracing::debug!(msg_type = message.kind(), "message queued");
        Ok(())
    }

    /// Owner only: starts the game.
    pub fn start_game(&self) -> Result<(), LobbyError> {
        self.send(OutboundMessage::Start)
    }

    /// Sends one stroke or fill. The local drawing is not touched; the
    /// board follows what the server sends back.
    pub fn draw(&self, command: DrawCommand) -> Result<(), LobbyError> {
        self.send(command.into())
    }

    pub fn clear_drawing_board(&self) -> Result<(), LobbyError> {
        self.send(OutboundMessage::ClearDrawingBoard)
    }

    /// Sends a chat line, which the server treats as a guess while the
    /// local player is guessing.
    pub fn send_chat(&self, text: impl Into<String>) -> Result<(), LobbyError> {
        self.send(OutboundMessage::Message(text.into()))
    }

    /// Picks one of the words offered by the last `your-turn`, by index.
    pub fn choose_word(&self, index: usize) -> Result<(), LobbyError> {
        self.send(OutboundMessage::ChooseWord(index))
    }

    pub fn change_name(&self, name: impl Into<String>) -> Result<(), LobbyError> {
        self.send(OutboundMessage::NameChange(name.into()))
    }

    /// Asks the server to resend the full drawing.
    pub fn request_drawing(&self) -> Result<(), LobbyError> {
        self.send(OutboundMessage::RequestDrawing)
    }

    pub fn vote_kick(&self, player_id: impl Into<String>) -> Result<(), LobbyError> {
        self.send(OutboundMessage::KickVote(player_id.into()))
    }

    pub fn keep_alive(&self) -> Result<(), LobbyError> {
        self.send(OutboundMessage::KeepAlive)
    }

    /// Closes the connection: pending outbound messages are flushed, the
    /// close handshake runs, and both background loops are joined.
    ///
    /// Messages already received stay available to one more
    /// [`apply_pending_events`](Self::apply_pending_events).
    pub async fn close(&mut self) {
        tracing::info!(lobby_id = %self.state.lobby_id(), "leaving lobby");
        self.link.close().await;
    }
}

impl std::fmt::Debug for Lobby {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lobby")
            .field("state", &self.state)
            .field("registry", &self.registry)
            .field("link", &self.link.state())
            .field("observers", &self.observers.len())
            .finish()
    }
}

type Handler<T> = fn(&mut LobbyState, T, &str) -> Result<(), LobbyError>;

fn builtin<T: Inbound>(registry: &mut ParserRegistry<LobbyState>, handler: Handler<T>) {
    registry.register(Decoder::new(handler).on_failure(log_failure));
}

fn log_failure(_state: &mut LobbyState, failure: &ParseFailure<'_>) {
    tracing::debug!(
        expected = failure.expected,
        decoded = ?failure.decoded,
        raw = failure.raw,
        "failed to parse message"
    );
}

fn builtin_registry() -> ParserRegistry<LobbyState> {
    use scrawl_protocol::inbound::*;

    let mut registry = ParserRegistry::new();
    builtin::<Ready>(&mut registry, LobbyState::on_ready);
    builtin::<NextTurn>(&mut registry, LobbyState::on_next_turn);
    builtin::<NameChange>(&mut registry, LobbyState::on_name_change);
    builtin::<UpdatePlayers>(&mut registry, LobbyState::on_update_players);
    builtin::<UpdateWordHint>(&mut registry, LobbyState::on_update_word_hint);
    builtin::<ChatMessage>(&mut registry, LobbyState::on_message);
    builtin::<NonGuessingChatMessage>(&mut registry, LobbyState::on_non_guessing_message);
    builtin::<SystemMessage>(&mut registry, LobbyState::on_system_message);
    builtin::<Line>(&mut registry, LobbyState::on_line);
    builtin::<Fill>(&mut registry, LobbyState::on_fill);
    builtin::<ClearDrawingBoard>(&mut registry, LobbyState::on_clear_drawing_board);
    builtin::<YourTurn>(&mut registry, LobbyState::on_your_turn);
    builtin::<CloseGuess>(&mut registry, LobbyState::on_close_guess);
    builtin::<CorrectGuess>(&mut registry, LobbyState::on_correct_guess);
    builtin::<KickVote>(&mut registry, LobbyState::on_kick_vote);
    builtin::<DrawerKicked>(&mut registry, LobbyState::on_drawer_kicked);
    builtin::<OwnerChange>(&mut registry, LobbyState::on_owner_change);
    builtin::<Drawing>(&mut registry, LobbyState::on_drawing);
    builtin::<LobbySettingsChanged>(&mut registry, LobbyState::on_lobby_settings_changed);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrawl_transport::LoopbackPeer;

    fn lobby() -> (Lobby, LoopbackPeer) {
        let (link, peer) = Link::loopback();
        (Lobby::new(LobbyInit::new("abc123"), link), peer)
    }

    #[test]
    fn test_every_server_type_has_a_decoder() {
        let (lobby, _peer) = lobby();
        for kind in [
            "ready", "next-turn", "name-change", "update-players", "update-wordhint",
            "message", "non-guessing-player-message", "system-message", "line", "fill",
            "clear-drawing-board", "your-turn", "close-guess", "correct-guess", "kick-vote",
            "drawer-kicked", "owner-change", "drawing", "lobby-settings-changed",
        ] {
            assert_eq!(lobby.registry.decoder_count(kind), 1, "{kind}");
        }
    }

    #[test]
    fn test_apply_with_nothing_queued_changes_nothing() {
        let (mut lobby, _peer) = lobby();
        assert!(lobby.apply_pending_events().is_empty());
        assert_eq!(lobby.state().current_round(), 0);
        assert!(lobby.state().players().is_empty());
    }

    #[test]
    fn test_send_encodes_envelope() {
        let (lobby, mut peer) = lobby();
        lobby.send_chat("is it a cat?").unwrap();
        lobby.keep_alive().unwrap();
        assert_eq!(
            peer.next_outbound().as_deref(),
            Some(r#"{"type":"message","data":"is it a cat?"}"#)
        );
        assert_eq!(peer.next_outbound().as_deref(), Some(r#"{"type":"keep-alive"}"#));
    }

    #[test]
    fn test_send_after_disconnect_is_not_connected() {
        let (lobby, peer) = lobby();
        peer.disconnect();
        assert!(!lobby.is_connected());
        assert!(matches!(lobby.start_game(), Err(LobbyError::NotConnected)));
    }

    #[test]
    fn test_unsubscribe() {
        let (mut lobby, _peer) = lobby();
        let id = lobby.subscribe(|_| {});
        assert!(lobby.unsubscribe(id));
        assert!(!lobby.unsubscribe(id));
    }
}
