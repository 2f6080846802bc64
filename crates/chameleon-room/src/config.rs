//! Room configuration and state machine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration shared by every room an [`Engine`](crate::Engine) creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Number of lowercase hex characters in a room code.
    ///
    /// Clamped to `1..=32`. If every code of this length is taken the
    /// engine falls back to longer codes rather than failing.
    pub id_length: usize,

    /// Lock the room automatically when the first round starts.
    ///
    /// Leaders can always lock explicitly; this only controls whether
    /// starting play implies it.
    pub lock_on_round_start: bool,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            id_length: 4,
            lock_on_round_start: true,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// Where a live room is in its lifecycle.
///
/// ```text
/// Open ──(first round started)──→ RoundActive ──(destroy)──→ [removed]
/// ```
///
/// Destroyed rooms are removed from the engine outright, so there is no
/// variant for them. The lock flag is tracked separately: an `Open` room
/// may already be locked, and under a permissive [`RoomConfig`] a
/// `RoundActive` room may still accept players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    /// No round has been played yet.
    Open,
    /// At least one round has been started.
    RoundActive,
}

impl RoomState {
    pub(crate) fn for_round(round_number: u64) -> Self {
        if round_number == 0 {
            Self::Open
        } else {
            Self::RoundActive
        }
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::RoundActive => write!(f, "RoundActive"),
        }
    }
}
