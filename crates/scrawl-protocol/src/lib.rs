//! Wire protocol for scrawl.
//!
//! This crate defines the "language" spoken over a lobby connection:
//!
//! - **Envelope** ([`EnvelopeHeader`], [`Envelope`]): every message is
//!   `{"type": "<kebab-case-name>", "data": <payload>}`.
//! - **Inbound payloads** ([`inbound`]): one schema per server message,
//!   each implementing [`Inbound`] with its own validity check.
//! - **Outbound messages** ([`OutboundMessage`]): what the client sends.
//! - **Board and game values**: [`DrawCommand`], [`Rgb`], [`WordHint`],
//!   [`PlayerRecord`], [`GameState`], [`Language`], [`LobbyLimits`].
//! - **Codec** ([`Codec`], [`JsonCodec`]) and **errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Transport (text frames) → Protocol (typed payloads) → Lobby (state)
//! ```
//!
//! The protocol layer knows nothing about connections or lobby state; it
//! only turns text into validated values and back.

mod codec;
mod color;
mod draw;
mod envelope;
mod error;
pub mod inbound;
mod language;
mod limits;
mod outbound;
mod player;

pub use codec::{Codec, JsonCodec};
pub use color::Rgb;
pub use draw::{
    DrawCommand, DrawKind, DrawingShape, FillData, LineData, Point,
    decode_drawing,
};
pub use envelope::{Envelope, EnvelopeHeader, Inbound};
pub use error::ProtocolError;
pub use language::Language;
pub use limits::LobbyLimits;
pub use outbound::OutboundMessage;
pub use player::{GameState, PlayerRecord, PlayerState, WordHint};
