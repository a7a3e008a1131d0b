use std::time::Duration;

use clap::Parser;
use scrawl::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// Joins a lobby, prints what happens in it, and sends stdin lines as chat.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Server `host[:port]`.
    #[clap(long, env = "SCRAWL_HOST", default_value = "localhost:8080")]
    host: String,
    /// Use https/wss.
    #[clap(long, env = "SCRAWL_SECURE")]
    secure: bool,
    /// Lobby to join.
    #[clap(short, long, env = "SCRAWL_LOBBY")]
    lobby: String,
    /// Name to play under.
    #[clap(short, long, env = "SCRAWL_NAME")]
    name: String,
    /// How often to apply received messages, in milliseconds.
    #[clap(long, default_value_t = 50)]
    tick_ms: u64,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn describe(event: &LobbyEvent, lobby: &LobbyState) -> Option<String> {
    let line = match event {
        LobbyEvent::Ready => format!(
            "joined {} (round {}/{}, {} players)",
            lobby.lobby_id(),
            lobby.current_round(),
            lobby.current_max_rounds(),
            lobby.players().len()
        ),
        LobbyEvent::NextTurn { round, previous_word } => match previous_word {
            Some(word) => format!("round {round}: the word was `{word}`"),
            None => format!("round {round}"),
        },
        LobbyEvent::YourTurn { words } => format!("your turn, pick one of {words:?}"),
        LobbyEvent::Chat(line) => format!("<{}> {}", line.author, line.content),
        LobbyEvent::NonGuessingChat(line) => format!("({}) {}", line.author, line.content),
        LobbyEvent::SystemMessage(text) => format!("* {text}"),
        LobbyEvent::CloseGuess(guess) => format!("* `{guess}` is close"),
        LobbyEvent::CorrectGuess { player_id, player } => {
            let name = player.as_ref().map_or_else(|| player_id.clone(), |p| p.name());
            format!("* {name} guessed the word")
        }
        LobbyEvent::NameChanged { new_name, .. } => format!("* someone is now {new_name}"),
        LobbyEvent::OwnerChanged { player_name, .. } => format!("* {player_name} owns the lobby"),
        LobbyEvent::KickVote {
            player_name,
            vote_count,
            required_vote_count,
            ..
        } => format!("* kick {player_name}? {vote_count}/{required_vote_count}"),
        LobbyEvent::DrawerKicked => "* the drawer was kicked".to_owned(),
        LobbyEvent::WordHintsUpdated => {
            let hint: String = lobby
                .word_hints()
                .iter()
                .map(|h| if h.is_hidden() { '_' } else { h.character })
                .collect();
            format!("hint: {hint}")
        }
        LobbyEvent::PlayersUpdated => {
            let board: Vec<String> = lobby
                .players()
                .sorted()
                .iter()
                .map(|p| {
                    let p = p.read();
                    format!("{} {}", p.name, p.score)
                })
                .collect();
            format!("scores: {}", board.join(", "))
        }
        _ => return None,
    };
    Some(line)
}

// ---------------------------------------------------------------------------
// Main loop
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let client = ScrawlClient::builder()
        .host(args.host)
        .secure(args.secure)
        .build();

    let Some(mut lobby) = client.join_lobby(&args.lobby, &args.name).await? else {
        tracing::error!(lobby = %args.lobby, "could not join lobby");
        return Ok(());
    };

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut tick = tokio::time::interval(Duration::from_millis(args.tick_ms.max(1)));

    loop {
        tokio::select! {
            _ = tick.tick() => {
                for event in lobby.apply_pending_events() {
                    if let Some(line) = describe(&event, lobby.state()) {
                        println!("{line}");
                    }
                }
                if !lobby.is_connected() {
                    tracing::info!("disconnected");
                    break;
                }
            }
            line = stdin.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let sent = match line.strip_prefix("/pick ") {
                    Some(index) => match index.trim().parse() {
                        Ok(index) => lobby.choose_word(index),
                        Err(_) => {
                            eprintln!("usage: /pick <index>");
                            continue;
                        }
                    },
                    None if line == "/start" => lobby.start_game(),
                    None => lobby.send_chat(line),
                };
                if let Err(e) = sent {
                    tracing::warn!(error = %e, "send failed");
                }
            }
        }
    }

    lobby.close().await;
    Ok(())
}
