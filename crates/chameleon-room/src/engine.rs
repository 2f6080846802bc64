//! The engine: owns every room and knows which player is in which room.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chameleon_protocol::{PlayerId, RoomId};
use rand::Rng;

use crate::{
    BuiltinCategories, CategoryProvider, Room, RoomConfig, RoomError,
    RoomSnapshot, Round,
};

/// Room codes are cut from 16 random bytes, so never longer than this.
const MAX_ID_LENGTH: usize = 32;

/// Collisions tolerated at one code length before trying a longer one.
const ATTEMPTS_PER_LENGTH: usize = 32;

/// The single source of truth for rooms and memberships.
///
/// # Concurrency
///
/// One exclusive lock covers the room registry, the player index, and
/// every room's internals. Each public method takes it once, does all of
/// its work, and releases it on return. Nothing inside the lock blocks or
/// awaits, so the engine is safe to call from async tasks; rooms serialize
/// against each other, which is fine at party-game request rates.
///
/// Methods take `&self`: share the engine as `Arc<Engine>`.
pub struct Engine<P: CategoryProvider = BuiltinCategories> {
    registry: Mutex<Registry>,
    provider: P,
    config: RoomConfig,
}

/// Everything the lock protects.
#[derive(Default)]
struct Registry {
    rooms: HashMap<RoomId, Room>,

    /// Which room each player is in.
    /// A player is in at most ONE room, and every member of every room
    /// has an entry here pointing back at it (key invariant).
    player_rooms: HashMap<PlayerId, RoomId>,
}

impl Engine {
    /// An engine with the default config and built-in categories.
    pub fn new() -> Self {
        Self::with_provider(RoomConfig::default(), BuiltinCategories::default())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: CategoryProvider> Engine<P> {
    /// An engine drawing its categories from `provider`.
    pub fn with_provider(config: RoomConfig, provider: P) -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
            provider,
            config,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// A panic can't leave the registry half-updated: every operation
    /// validates before it mutates. So a poisoned lock is still usable.
    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a room led by `player` and returns its code.
    ///
    /// # Errors
    /// [`RoomError::PlayerAlreadyInRoom`] if the player is in any room.
    pub fn create_room(&self, player: PlayerId) -> Result<RoomId, RoomError> {
        let mut registry = self.registry();
        if registry.player_rooms.contains_key(&player) {
            tracing::debug!(%player, "create rejected: already in a room");
            return Err(RoomError::PlayerAlreadyInRoom(player));
        }

        let room_id = registry.fresh_room_id(self.config.id_length);
        let room = Room::new(room_id.clone(), player.clone(), &self.config);
        registry.rooms.insert(room_id.clone(), room);
        registry.player_rooms.insert(player.clone(), room_id.clone());

        tracing::info!(%room_id, leader = %player, "room created");
        Ok(room_id)
    }

    /// Adds `player` to an existing room.
    ///
    /// A player already in a different room must have that room destroyed
    /// first; joining never silently moves someone.
    ///
    /// # Errors
    /// - [`RoomError::RoomDoesNotExist`] for an unknown code
    /// - [`RoomError::PlayerAlreadyInRequestedRoom`] if already a member
    /// - [`RoomError::PlayerAlreadyInRoom`] if in another room
    /// - [`RoomError::RoomIsLocked`] if the room stopped accepting players
    pub fn join_room(
        &self,
        player: PlayerId,
        room_id: &RoomId,
    ) -> Result<(), RoomError> {
        let mut registry = self.registry();
        let Registry {
            rooms,
            player_rooms,
        } = &mut *registry;

        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| RoomError::RoomDoesNotExist(room_id.clone()))?;

        match player_rooms.get(&player) {
            Some(current) if current == room_id => {
                return Err(RoomError::PlayerAlreadyInRequestedRoom(
                    player,
                    room_id.clone(),
                ));
            }
            Some(current) => {
                tracing::debug!(
                    %player, %current, requested = %room_id,
                    "join rejected: already in another room"
                );
                return Err(RoomError::PlayerAlreadyInRoom(player));
            }
            None => {}
        }

        room.add_player(player.clone())?;
        player_rooms.insert(player.clone(), room_id.clone());

        tracing::info!(
            %room_id,
            %player,
            players = room.players().len(),
            "player joined"
        );
        Ok(())
    }

    /// A snapshot of the caller's room.
    ///
    /// # Errors
    /// - [`RoomError::PlayerNotInRoom`] unless the caller is in `room_id`
    /// - [`RoomError::RoomDoesNotExist`] if the room is gone
    pub fn room_info(
        &self,
        player: &PlayerId,
        room_id: &RoomId,
    ) -> Result<RoomSnapshot, RoomError> {
        let registry = self.registry();
        let room = registry.member_room(player, room_id)?;
        Ok(room.snapshot())
    }

    /// Stops the caller's room from accepting new players. Leader only.
    ///
    /// Locking an already locked room succeeds and changes nothing.
    pub fn lock_room(
        &self,
        player: &PlayerId,
        room_id: &RoomId,
    ) -> Result<(), RoomError> {
        let mut registry = self.registry();
        let room = registry.led_room_mut(player, room_id)?;
        if room.lock() {
            tracing::info!(%room_id, "room locked");
        }
        Ok(())
    }

    /// Removes the caller's room and releases every member. Leader only.
    pub fn destroy_room(
        &self,
        player: &PlayerId,
        room_id: &RoomId,
    ) -> Result<(), RoomError> {
        let mut registry = self.registry();
        registry.led_room_mut(player, room_id)?;

        let Some(mut room) = registry.rooms.remove(room_id) else {
            return Err(RoomError::RoomDoesNotExist(room_id.clone()));
        };
        let members = room.take_players();
        for member in &members {
            registry.player_rooms.remove(member);
        }

        tracing::info!(
            room_id = %room.id(),
            leader = %room.leader(),
            released = members.len(),
            "room destroyed"
        );
        Ok(())
    }

    /// Starts a new round in the caller's room. Leader only.
    ///
    /// Returns the new round number (1 for the first round).
    pub fn start_new_round(
        &self,
        player: &PlayerId,
        room_id: &RoomId,
    ) -> Result<u64, RoomError> {
        let mut registry = self.registry();
        let room = registry.led_room_mut(player, room_id)?;
        let round = room.start_new_round(&self.provider)?;

        tracing::info!(
            room_id = %room.id(),
            round,
            players = room.players().len(),
            locked = room.is_locked(),
            "round started"
        );
        Ok(round)
    }

    /// The round numbered `round_number` in the caller's room.
    ///
    /// Only the latest round is kept; any other number, including 0
    /// before play starts, is [`RoomError::RoundDoesNotExist`].
    ///
    /// The returned [`Round`] includes the secret word. Hiding it from the
    /// chameleon is the caller's job.
    pub fn round_info(
        &self,
        player: &PlayerId,
        room_id: &RoomId,
        round_number: u64,
    ) -> Result<Round, RoomError> {
        let registry = self.registry();
        let room = registry.member_room(player, room_id)?;

        let missing = || RoomError::RoundDoesNotExist {
            room_id: room_id.clone(),
            round: round_number,
        };
        if room.round_number() != round_number {
            return Err(missing());
        }
        room.current_round().ok_or_else(missing)
    }

    /// Drops every room and membership.
    pub fn reset(&self) {
        let mut registry = self.registry();
        let rooms = registry.rooms.len();
        *registry = Registry::default();
        tracing::info!(rooms, "engine reset");
    }

    /// The room `player` is currently in, if any.
    pub fn player_room(&self, player: &PlayerId) -> Option<RoomId> {
        self.registry().player_rooms.get(player).cloned()
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.registry().rooms.len()
    }
}

impl Registry {
    /// The room `player` is in, provided it is `room_id`.
    fn member_room(
        &self,
        player: &PlayerId,
        room_id: &RoomId,
    ) -> Result<&Room, RoomError> {
        if self.player_rooms.get(player) != Some(room_id) {
            return Err(RoomError::PlayerNotInRoom(
                player.clone(),
                room_id.clone(),
            ));
        }
        self.rooms
            .get(room_id)
            .ok_or_else(|| RoomError::RoomDoesNotExist(room_id.clone()))
    }

    /// Like [`member_room`](Self::member_room), but `player` must also
    /// lead the room.
    fn led_room_mut(
        &mut self,
        player: &PlayerId,
        room_id: &RoomId,
    ) -> Result<&mut Room, RoomError> {
        if self.player_rooms.get(player) != Some(room_id) {
            return Err(RoomError::PlayerNotInRoom(
                player.clone(),
                room_id.clone(),
            ));
        }
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| RoomError::RoomDoesNotExist(room_id.clone()))?;
        if !room.is_leader(player) {
            tracing::debug!(%room_id, %player, "rejected: not the leader");
            return Err(RoomError::PlayerNotRoomLeader(
                player.clone(),
                room_id.clone(),
            ));
        }
        Ok(room)
    }

    /// A code no live room is using. Grows past `length` only when
    /// codes of that length keep colliding.
    fn fresh_room_id(&self, length: usize) -> RoomId {
        let mut length = length.clamp(1, MAX_ID_LENGTH);
        loop {
            for _ in 0..ATTEMPTS_PER_LENGTH {
                let candidate = RoomId(generate_code(length));
                if !self.rooms.contains_key(&candidate) {
                    return candidate;
                }
            }
            length = (length + 1).min(MAX_ID_LENGTH);
        }
    }
}

/// `length` lowercase hex characters.
fn generate_code(length: usize) -> String {
    let bytes: [u8; MAX_ID_LENGTH / 2] = rand::rng().random();
    let mut code: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    code.truncate(length);
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_length_and_alphabet() {
        for length in [1, 4, 9, 32] {
            let code = generate_code(length);
            assert_eq!(code.len(), length);
            assert!(code.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_fresh_room_id_grows_when_short_codes_are_exhausted() {
        // All 16 one-character codes taken: the next must be longer.
        let mut registry = Registry::default();
        let config = RoomConfig::default();
        for c in "0123456789abcdef".chars() {
            let id = RoomId(c.to_string());
            registry
                .rooms
                .insert(id.clone(), Room::new(id, PlayerId::from("p"), &config));
        }

        let id = registry.fresh_room_id(1);

        assert!(id.as_str().len() > 1, "got {id}");
        assert!(!registry.rooms.contains_key(&id));
    }

    #[test]
    fn test_fresh_room_id_clamps_length() {
        let registry = Registry::default();
        assert_eq!(registry.fresh_room_id(0).as_str().len(), 1);
        assert_eq!(registry.fresh_room_id(500).as_str().len(), MAX_ID_LENGTH);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        use std::sync::Arc;

        let engine = Arc::new(Engine::new());
        let room = engine.create_room(PlayerId::from("alice")).unwrap();

        let poisoner = Arc::clone(&engine);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.registry.lock().unwrap();
            panic!("poison the registry");
        })
        .join();

        assert!(engine.registry.is_poisoned());
        let info = engine.room_info(&PlayerId::from("alice"), &room).unwrap();
        assert_eq!(info.players, vec![PlayerId::from("alice")]);
    }
}
