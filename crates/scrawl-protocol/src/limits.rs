//! Server-declared bounds on lobby configuration.

use std::ops::RangeInclusive;

use crate::ProtocolError;

/// Immutable min/max bounds for the configurable parts of a lobby.
///
/// Ten bounds in five inclusive pairs. Construction checks every pair
/// once (`min <= max`, `min >= 1`); afterwards the predicates are plain
/// range checks and cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbyLimits {
    drawing_time: (u32, u32),
    round_count: (u32, u32),
    max_player_count: (u32, u32),
    clients_per_ip: (u32, u32),
    brush_size: (u32, u32),
}

impl LobbyLimits {
    /// The bounds used when the server does not advertise its own, and
    /// for validating lobby-creation parameters.
    pub const DEFAULT: LobbyLimits = LobbyLimits {
        drawing_time: (60, 300),
        round_count: (1, 20),
        max_player_count: (2, 24),
        clients_per_ip: (1, 24),
        brush_size: (8, 32),
    };

    /// Builds a set of limits. Drawing time is in seconds.
    ///
    /// # Errors
    /// Returns `ProtocolError::InvalidLimits` naming the first pair whose
    /// minimum exceeds its maximum or is below 1.
    pub fn new(
        drawing_time: RangeInclusive<u32>,
        round_count: RangeInclusive<u32>,
        max_player_count: RangeInclusive<u32>,
        clients_per_ip: RangeInclusive<u32>,
        brush_size: RangeInclusive<u32>,
    ) -> Result<Self, ProtocolError> {
        Ok(Self {
            drawing_time: checked_pair("drawing time", drawing_time)?,
            round_count: checked_pair("round count", round_count)?,
            max_player_count: checked_pair("max player count", max_player_count)?,
            clients_per_ip: checked_pair("clients per IP", clients_per_ip)?,
            brush_size: checked_pair("brush size", brush_size)?,
        })
    }

    pub fn is_drawing_time_valid(&self, seconds: u32) -> bool {
        within(self.drawing_time, seconds)
    }

    pub fn is_round_count_valid(&self, rounds: u32) -> bool {
        within(self.round_count, rounds)
    }

    pub fn is_max_player_count_valid(&self, players: u32) -> bool {
        within(self.max_player_count, players)
    }

    pub fn is_clients_per_ip_valid(&self, clients: u32) -> bool {
        within(self.clients_per_ip, clients)
    }

    pub fn is_brush_size_valid(&self, size: u32) -> bool {
        within(self.brush_size, size)
    }

    pub fn drawing_time(&self) -> RangeInclusive<u32> {
        self.drawing_time.0..=self.drawing_time.1
    }

    pub fn round_count(&self) -> RangeInclusive<u32> {
        self.round_count.0..=self.round_count.1
    }

    pub fn max_player_count(&self) -> RangeInclusive<u32> {
        self.max_player_count.0..=self.max_player_count.1
    }

    pub fn clients_per_ip(&self) -> RangeInclusive<u32> {
        self.clients_per_ip.0..=self.clients_per_ip.1
    }

    pub fn brush_size(&self) -> RangeInclusive<u32> {
        self.brush_size.0..=self.brush_size.1
    }
}

impl Default for LobbyLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn checked_pair(name: &str, range: RangeInclusive<u32>) -> Result<(u32, u32), ProtocolError> {
    let (min, max) = range.into_inner();
    if min < 1 {
        return Err(ProtocolError::InvalidLimits(format!(
            "{name} minimum must be at least 1, got {min}"
        )));
    }
    if min > max {
        return Err(ProtocolError::InvalidLimits(format!(
            "{name} minimum {min} exceeds maximum {max}"
        )));
    }
    Ok((min, max))
}

fn within((min, max): (u32, u32), value: u32) -> bool {
    (min..=max).contains(&value)
}
