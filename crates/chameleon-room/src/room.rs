//! A single game session: membership, leadership, and round state.
//!
//! `Room` is a plain struct mutated through `&mut self`. It does no
//! locking of its own: the [`Engine`](crate::Engine) only touches a room
//! while holding the registry lock, and nothing else can reach one.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chameleon_protocol::{PlayerId, RoomId};
use rand::Rng;

use crate::{CategoryProvider, RoomConfig, RoomError, RoomState, Round};

/// A copy of a room's metadata. Never includes round contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    /// The room's code.
    pub room_id: RoomId,
    /// Members in join order. The leader is always first.
    pub players: Vec<PlayerId>,
    pub leader: PlayerId,
    pub is_locked: bool,
    /// Number of rounds started so far (0 before the first).
    pub round_number: u64,
    pub state: RoomState,
    /// When the room was created, to the second.
    pub last_updated: SystemTime,
}

impl RoomSnapshot {
    /// Returns `true` if `player` leads this room.
    pub fn is_leader(&self, player: &PlayerId) -> bool {
        self.leader == *player
    }
}

/// One room's mutable state.
///
/// Invariants:
/// - `leader` is in `players` and is never replaced
/// - `players` holds no duplicates
/// - `round_number` only goes up
/// - once `locked` is set it stays set
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    players: Vec<PlayerId>,
    leader: PlayerId,
    locked: bool,
    lock_on_round_start: bool,
    round_number: u64,
    current_round: Option<Round>,
    created_at: SystemTime,
}

impl Room {
    /// Creates a room whose only member is its leader.
    pub fn new(id: RoomId, leader: PlayerId, config: &RoomConfig) -> Self {
        Self {
            id,
            players: vec![leader.clone()],
            leader,
            locked: false,
            lock_on_round_start: config.lock_on_round_start,
            round_number: 0,
            current_round: None,
            created_at: now_to_the_second(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn leader(&self) -> &PlayerId {
        &self.leader
    }

    pub fn is_leader(&self, player: &PlayerId) -> bool {
        self.leader == *player
    }

    /// Members in join order.
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    pub fn contains(&self, player: &PlayerId) -> bool {
        self.players.contains(player)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn round_number(&self) -> u64 {
        self.round_number
    }

    /// Adds a member at the end of the join order.
    ///
    /// # Errors
    /// - [`RoomError::RoomIsLocked`] if the room stopped accepting players
    /// - [`RoomError::PlayerAlreadyInRequestedRoom`] if already a member
    pub fn add_player(&mut self, player: PlayerId) -> Result<(), RoomError> {
        if self.locked {
            return Err(RoomError::RoomIsLocked(self.id.clone()));
        }
        if self.contains(&player) {
            return Err(RoomError::PlayerAlreadyInRequestedRoom(
                player,
                self.id.clone(),
            ));
        }
        self.players.push(player);
        Ok(())
    }

    /// Stops accepting new players. Returns `false` if already locked.
    pub fn lock(&mut self) -> bool {
        let changed = !self.locked;
        self.locked = true;
        changed
    }

    /// Picks a chameleon uniformly from the current members, builds a new
    /// round from `provider`, and advances the round counter.
    ///
    /// Returns the new round number. The previous round is discarded.
    ///
    /// # Errors
    /// [`RoomError::RoomIsEmpty`] if there is nobody to pick. The engine
    /// never produces an empty room; this guards direct use.
    pub fn start_new_round<P>(&mut self, provider: &P) -> Result<u64, RoomError>
    where
        P: CategoryProvider + ?Sized,
    {
        if self.players.is_empty() {
            return Err(RoomError::RoomIsEmpty(self.id.clone()));
        }
        let index = rand::rng().random_range(0..self.players.len());
        let chameleon = self.players[index].clone();

        self.current_round = Some(Round::new(chameleon, &provider.pick()));
        self.round_number += 1;
        if self.lock_on_round_start {
            self.locked = true;
        }
        Ok(self.round_number)
    }

    /// A copy of the latest round, or `None` before the first one.
    pub fn current_round(&self) -> Option<Round> {
        self.current_round.clone()
    }

    /// A copy of the room's metadata.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.id.clone(),
            players: self.players.clone(),
            leader: self.leader.clone(),
            is_locked: self.locked,
            round_number: self.round_number,
            state: RoomState::for_round(self.round_number),
            last_updated: self.created_at,
        }
    }

    /// Empties the member list, returning who was in it.
    ///
    /// Only used by the engine while tearing the room down.
    pub(crate) fn take_players(&mut self) -> Vec<PlayerId> {
        std::mem::take(&mut self.players)
    }
}

fn now_to_the_second() -> SystemTime {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    UNIX_EPOCH + Duration::from_secs(secs)
}
