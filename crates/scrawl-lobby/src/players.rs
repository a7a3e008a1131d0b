//! Player registry with identity-preserving updates.
//!
//! Consumers (a scoreboard, a "who is drawing" label) keep
//! [`PlayerHandle`]s around for as long as they like. Updates from the
//! server mutate the player behind an existing handle instead of replacing
//! it, so a handle captured once keeps showing current values until that
//! player leaves.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use scrawl_protocol::{PlayerRecord, PlayerState};

/// A player's current values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub score: i64,
    pub connected: bool,
    /// Points gained in the previous turn.
    pub last_score: i64,
    pub rank: u32,
    pub state: PlayerState,
}

impl Player {
    fn from_record(record: &PlayerRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            score: record.score,
            connected: record.connected,
            last_score: record.last_score,
            rank: record.rank,
            state: record.state,
        }
    }

    /// Copies every mutable field from `record`; the ID stays.
    fn apply(&mut self, record: &PlayerRecord) {
        self.name.clone_from(&record.name);
        self.score = record.score;
        self.connected = record.connected;
        self.last_score = record.last_score;
        self.rank = record.rank;
        self.state = record.state;
    }
}

/// A shared reference to one player.
///
/// Cloning a handle is cheap and every clone observes the same player.
#[derive(Debug, Clone)]
pub struct PlayerHandle(Arc<RwLock<Player>>);

impl PlayerHandle {
    fn new(player: Player) -> Self {
        Self(Arc::new(RwLock::new(player)))
    }

    /// Borrows the player's current values.
    ///
    /// The lobby only writes during `apply_pending_events`; keep the guard
    /// short so that call is never blocked.
    pub fn read(&self) -> RwLockReadGuard<'_, Player> {
        self.0.read()
    }

    /// Copies the player's current values out.
    pub fn snapshot(&self) -> Player {
        self.0.read().clone()
    }

    pub fn id(&self) -> String {
        self.0.read().id.clone()
    }

    pub fn name(&self) -> String {
        self.0.read().name.clone()
    }

    /// Returns `true` if both handles refer to the same player object.
    pub fn same(a: &PlayerHandle, b: &PlayerHandle) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    fn set_name(&self, name: &str) {
        self.0.write().name = name.to_owned();
    }
}

/// All players in a lobby, keyed by ID.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<String, PlayerHandle>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings the registry in line with a complete player list.
    ///
    /// Known IDs are updated in place, new IDs are inserted, and every ID
    /// not present in `records` is removed.
    pub fn update_all(&mut self, records: &[PlayerRecord]) {
        let mut departed: HashSet<String> = self.players.keys().cloned().collect();

        for record in records {
            match self.players.get(&record.id) {
                Some(handle) => handle.0.write().apply(record),
                None => {
                    self.players
                        .insert(record.id.clone(), PlayerHandle::new(Player::from_record(record)));
                }
            }
            departed.remove(&record.id);
        }

        for id in departed {
            self.players.remove(&id);
            tracing::debug!(player_id = %id, "player left");
        }
    }

    /// Renames a player. Returns `false` if the ID is unknown.
    pub fn rename(&mut self, id: &str, name: &str) -> bool {
        match self.players.get(id) {
            Some(handle) => {
                handle.set_name(name);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&PlayerHandle> {
        self.players.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.players.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Iterates over the players in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &PlayerHandle> {
        self.players.values()
    }

    /// Players ordered for display: by rank (unranked last), then name,
    /// then ID.
    pub fn sorted(&self) -> Vec<PlayerHandle> {
        let mut players: Vec<(Player, PlayerHandle)> =
            self.players.values().map(|h| (h.snapshot(), h.clone())).collect();
        players.sort_by(|(a, _), (b, _)| display_order(a, b));
        players.into_iter().map(|(_, handle)| handle).collect()
    }
}

fn display_order(a: &Player, b: &Player) -> Ordering {
    let rank = |p: &Player| if p.rank == 0 { u32::MAX } else { p.rank };
    rank(a)
        .cmp(&rank(b))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}
