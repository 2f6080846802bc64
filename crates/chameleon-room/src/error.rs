//! Error types for the room layer.

use chameleon_protocol::{PlayerId, RoomId};

/// Errors that can occur during room operations.
///
/// Every variant is an expected, caller-facing outcome. A failed
/// operation never changes engine state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// The player already belongs to a room and can't create or join
    /// another one.
    #[error("player {0} is already in a room")]
    PlayerAlreadyInRoom(PlayerId),

    /// The player is already a member of the room they asked to join.
    #[error("player {0} is already in room {1}")]
    PlayerAlreadyInRequestedRoom(PlayerId, RoomId),

    /// The player is not a member of the room they are acting on.
    #[error("player {0} is not in room {1}")]
    PlayerNotInRoom(PlayerId, RoomId),

    /// No live room has this id.
    #[error("room {0} does not exist")]
    RoomDoesNotExist(RoomId),

    /// A leader-only action was attempted by someone else.
    #[error("player {0} is not the leader of room {1}")]
    PlayerNotRoomLeader(PlayerId, RoomId),

    /// The room stopped accepting players.
    #[error("room {0} is locked")]
    RoomIsLocked(RoomId),

    /// Only the current round can be read.
    #[error("round {round} does not exist in room {room_id}")]
    RoundDoesNotExist { room_id: RoomId, round: u64 },

    /// A round can't start without anyone to be the chameleon.
    #[error("room {0} has no players")]
    RoomIsEmpty(RoomId),
}

impl RoomError {
    /// HTTP-style status code reported to clients.
    pub fn code(&self) -> u16 {
        match self {
            Self::PlayerNotInRoom(..) | Self::PlayerNotRoomLeader(..) => 403,
            Self::RoomDoesNotExist(_) | Self::RoundDoesNotExist { .. } => 404,
            Self::PlayerAlreadyInRoom(_)
            | Self::PlayerAlreadyInRequestedRoom(..)
            | Self::RoomIsLocked(_)
            | Self::RoomIsEmpty(_) => 409,
        }
    }
}
