//! Error types for the protocol layer.

/// Errors that can occur in the protocol layer.
///
/// A `ProtocolError` always means the bytes on the wire were the problem,
/// never the game rules. Rule violations are reported by the room layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, an unknown request `type`, missing
    /// fields, or a round number that isn't a non-negative integer.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded fine but violates protocol rules,
    /// e.g. a request with an empty player id. See
    /// [`Request::validate`](crate::Request::validate).
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
