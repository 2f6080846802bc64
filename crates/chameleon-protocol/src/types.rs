//! Core protocol types for Chameleon's wire format.
//!
//! Every type in this module is serialized to JSON, sent over a
//! WebSocket, and deserialized by the other side. Clients poll: each
//! request gets exactly one response, correlated by `seq`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The identity of a player.
///
/// Players are not registered anywhere. The string is supplied by the
/// client and trusted as-is; a player "exists" only while some room lists
/// them as a member.
///
/// `#[serde(transparent)]` makes `PlayerId("alice")` serialize as plain
/// `"alice"` rather than `{ "0": "alice" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Returns the raw identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty string, which no request may use.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A short room code, e.g. `"3fa9"`.
///
/// Players type this code to join a friend's room, so it is a string
/// rather than a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Returns the raw room code.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for RoomId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// Request: client → server
// ---------------------------------------------------------------------------

/// Everything a client can ask the server to do.
///
/// `#[serde(tag = "type")]` gives internally tagged JSON:
///   `{ "type": "JoinRoom", "player": "bob", "room_id": "3fa9" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Liveness check. Answered with [`Response::Pong`].
    Ping,

    /// Create a new room with `player` as its leader and only member.
    CreateRoom { player: PlayerId },

    /// Join an existing room.
    JoinRoom { player: PlayerId, room_id: RoomId },

    /// Read the membership and round counter of the caller's room.
    GetRoomInfo { player: PlayerId, room_id: RoomId },

    /// Leader only: pick a new chameleon and secret word.
    StartNewRound { player: PlayerId, room_id: RoomId },

    /// Read the caller's view of a round. Only the current round exists.
    GetRoundInfo {
        player: PlayerId,
        room_id: RoomId,
        round_number: u64,
    },

    /// Leader only: stop accepting new players.
    LockRoom { player: PlayerId, room_id: RoomId },

    /// Leader only: remove the room and release every member.
    DestroyRoom { player: PlayerId, room_id: RoomId },

    /// Administrative: drop every room. Intended for tests and ops.
    Reset,
}

impl Request {
    /// The calling player, for requests that carry one.
    pub fn player(&self) -> Option<&PlayerId> {
        match self {
            Self::Ping | Self::Reset => None,
            Self::CreateRoom { player }
            | Self::JoinRoom { player, .. }
            | Self::GetRoomInfo { player, .. }
            | Self::StartNewRound { player, .. }
            | Self::GetRoundInfo { player, .. }
            | Self::LockRoom { player, .. }
            | Self::DestroyRoom { player, .. } => Some(player),
        }
    }

    /// The target room, for room-scoped requests.
    pub fn room_id(&self) -> Option<&RoomId> {
        match self {
            Self::Ping | Self::Reset | Self::CreateRoom { .. } => None,
            Self::JoinRoom { room_id, .. }
            | Self::GetRoomInfo { room_id, .. }
            | Self::StartNewRound { room_id, .. }
            | Self::GetRoundInfo { room_id, .. }
            | Self::LockRoom { room_id, .. }
            | Self::DestroyRoom { room_id, .. } => Some(room_id),
        }
    }

    /// Rejects requests whose identifiers are empty strings.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidMessage`] naming the first empty field,
    /// e.g. `"player is required"`.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.player().is_some_and(PlayerId::is_empty) {
            return Err(ProtocolError::InvalidMessage(
                "player is required".into(),
            ));
        }
        if self.room_id().is_some_and(RoomId::is_empty) {
            return Err(ProtocolError::InvalidMessage(
                "room_id is required".into(),
            ));
        }
        Ok(())
    }

    /// The request's `type` tag, used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ping => "Ping",
            Self::CreateRoom { .. } => "CreateRoom",
            Self::JoinRoom { .. } => "JoinRoom",
            Self::GetRoomInfo { .. } => "GetRoomInfo",
            Self::StartNewRound { .. } => "StartNewRound",
            Self::GetRoundInfo { .. } => "GetRoundInfo",
            Self::LockRoom { .. } => "LockRoom",
            Self::DestroyRoom { .. } => "DestroyRoom",
            Self::Reset => "Reset",
        }
    }
}

// ---------------------------------------------------------------------------
// Response: server → client
// ---------------------------------------------------------------------------

/// The server's answer to a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Pong,

    RoomCreated { room_id: RoomId },

    Joined { room_id: RoomId },

    /// The caller's view of a room.
    RoomInfo {
        is_leader: bool,
        players: Vec<PlayerId>,
        current_round: u64,
        is_locked: bool,
    },

    RoundStarted { round_number: u64 },

    /// The caller's view of a round.
    ///
    /// `secret_word` is absent for the chameleon: the field is skipped
    /// entirely rather than sent as `null`, so a curious chameleon
    /// inspecting the raw JSON learns nothing.
    RoundInfo {
        is_chameleon: bool,
        words: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        secret_word: Option<String>,
    },

    Locked,

    RoomDestroyed,

    ResetDone,

    /// The request failed. `code` follows HTTP conventions
    /// (400 bad request, 403 forbidden, 404 not found, 409 conflict).
    Error { code: u16, message: String },
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The top-level wire wrapper.
///
/// The client picks `seq`; the server echoes it on the response so a
/// client with several requests in flight can match the answers up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub seq: u64,
    pub body: T,
}

/// A request as it arrives on the wire.
pub type RequestEnvelope = Envelope<Request>;

/// A response as it leaves the server.
pub type ResponseEnvelope = Envelope<Response>;

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The browser client parses these exact JSON shapes, so the serde
    //! attributes are pinned here.

    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlayerId::from("alice")).unwrap();
        assert_eq!(json, "\"alice\"");
    }

    #[test]
    fn test_room_id_deserializes_from_plain_string() {
        let room: RoomId = serde_json::from_str("\"3fa9\"").unwrap();
        assert_eq!(room, RoomId::from("3fa9"));
        assert_eq!(room.to_string(), "3fa9");
    }

    #[test]
    fn test_request_join_room_json_format() {
        let req = Request::JoinRoom {
            player: PlayerId::from("bob"),
            room_id: RoomId::from("3fa9"),
        };
        let json: serde_json::Value = serde_json::to_value(&req).unwrap();

        assert_eq!(json["type"], "JoinRoom");
        assert_eq!(json["player"], "bob");
        assert_eq!(json["room_id"], "3fa9");
    }

    #[test]
    fn test_request_unit_variants_are_bare_tags() {
        let json: serde_json::Value =
            serde_json::to_value(&Request::Reset).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "Reset" }));

        let ping: Request =
            serde_json::from_str(r#"{ "type": "Ping" }"#).unwrap();
        assert_eq!(ping, Request::Ping);
    }

    #[test]
    fn test_request_accessors() {
        assert_eq!(Request::Ping.player(), None);
        assert_eq!(
            Request::CreateRoom { player: PlayerId::from("a") }.room_id(),
            None
        );
        assert_eq!(Request::Reset.player(), None);

        let req = Request::LockRoom {
            player: PlayerId::from("lead"),
            room_id: RoomId::from("r"),
        };
        assert_eq!(req.player(), Some(&PlayerId::from("lead")));
        assert_eq!(req.room_id(), Some(&RoomId::from("r")));
        assert_eq!(req.kind(), "LockRoom");
    }

    #[test]
    fn test_request_validate_names_empty_field() {
        let no_player = Request::GetRoomInfo {
            player: PlayerId::from(""),
            room_id: RoomId::from(""),
        };
        let no_room = Request::DestroyRoom {
            player: PlayerId::from("lead"),
            room_id: RoomId::from(""),
        };

        assert!(matches!(
            no_player.validate(),
            Err(ProtocolError::InvalidMessage(reason)) if reason == "player is required"
        ));
        assert!(matches!(
            no_room.validate(),
            Err(ProtocolError::InvalidMessage(reason)) if reason == "room_id is required"
        ));
        assert!(Request::Reset.validate().is_ok());
        assert!(
            Request::CreateRoom { player: PlayerId::from("a") }
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_response_room_info_json_format() {
        let resp = Response::RoomInfo {
            is_leader: true,
            players: vec![PlayerId::from("a"), PlayerId::from("b")],
            current_round: 2,
            is_locked: false,
        };
        let json: serde_json::Value = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["type"], "RoomInfo");
        assert_eq!(json["is_leader"], true);
        assert_eq!(json["players"], serde_json::json!(["a", "b"]));
        assert_eq!(json["current_round"], 2);
        assert_eq!(json["is_locked"], false);
    }

    #[test]
    fn test_response_round_info_omits_secret_for_chameleon() {
        let resp = Response::RoundInfo {
            is_chameleon: true,
            words: vec!["Pizza".into(), "Soup".into()],
            secret_word: None,
        };
        let json: serde_json::Value = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["is_chameleon"], true);
        assert!(
            json.get("secret_word").is_none(),
            "secret_word must not appear at all, got {json}"
        );
    }

    #[test]
    fn test_response_round_info_missing_secret_deserializes_as_none() {
        let resp: Response = serde_json::from_str(
            r#"{ "type": "RoundInfo", "is_chameleon": true, "words": [] }"#,
        )
        .unwrap();

        assert_eq!(
            resp,
            Response::RoundInfo {
                is_chameleon: true,
                words: vec![],
                secret_word: None,
            }
        );
    }

    #[test]
    fn test_envelope_json_format() {
        let env = Envelope {
            seq: 9,
            body: Response::RoundStarted { round_number: 1 },
        };
        let json: serde_json::Value = serde_json::to_value(&env).unwrap();

        assert_eq!(json["seq"], 9);
        assert_eq!(json["body"]["type"], "RoundStarted");
        assert_eq!(json["body"]["round_number"], 1);
    }
}
