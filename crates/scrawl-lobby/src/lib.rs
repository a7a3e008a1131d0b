//! Lobby protocol engine for scrawl.
//!
//! A [`Lobby`] ties together:
//!
//! - a [`Link`](scrawl_transport::Link) carrying text frames to and from
//!   the server;
//! - a [`ParserRegistry`] that routes each frame to typed decoders;
//! - the [`LobbyState`] those decoders mutate: players, round, word
//!   hints, and the drawing.
//!
//! All mutation happens inside [`Lobby::apply_pending_events`], called by
//! the host on its own cadence. Observers registered with
//! [`Lobby::subscribe`] receive a [`LobbyEvent`] per applied message.
//!
//! # Key types
//!
//! - [`Lobby`]: the engine
//! - [`LobbyState`]: read access to everything the client knows
//! - [`PlayerRegistry`] / [`PlayerHandle`]: players with stable identity
//! - [`ParserRegistry`] / [`Decoder`]: message routing
//! - [`LobbyInit`] / [`LobbySettings`]: construction values

mod config;
mod error;
mod event;
mod lobby;
mod players;
mod registry;
mod state;

pub use config::{LobbyInit, LobbySettings};
pub use error::LobbyError;
pub use event::LobbyEvent;
pub use lobby::{Lobby, ObserverId};
pub use players::{Player, PlayerHandle, PlayerRegistry};
pub use registry::{DecoderId, Decoder, Dispatch, ParseFailure, ParserRegistry};
pub use state::LobbyState;
