//! Unified error type for the Chameleon server.

use chameleon_protocol::ProtocolError;
use chameleon_room::RoomError;

use crate::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ChameleonError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A game-rule error (not in room, not leader, locked, ...).
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chameleon_protocol::RoomId;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed;
        let chameleon_err: ChameleonError = err.into();
        assert!(matches!(chameleon_err, ChameleonError::Transport(_)));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let chameleon_err: ChameleonError = err.into();
        assert!(matches!(chameleon_err, ChameleonError::Protocol(_)));
        assert!(chameleon_err.to_string().contains("bad"));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::RoomDoesNotExist(RoomId::from("abcd"));
        let chameleon_err: ChameleonError = err.into();
        assert!(matches!(chameleon_err, ChameleonError::Room(_)));
        assert_eq!(chameleon_err.to_string(), "room abcd does not exist");
    }
}
