//! Wire protocol for Chameleon.
//!
//! This crate defines the "language" that polling clients and the server
//! speak:
//!
//! - **Types** ([`Request`], [`Response`], [`Envelope`], [`PlayerId`],
//!   [`RoomId`]): the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those structures
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between the WebSocket connection (raw bytes)
//! and the room engine (game rules). It knows nothing about rooms beyond
//! their identifiers.
//!
//! ```text
//! Connection (bytes) → Protocol (Envelope<Request>) → Engine
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Envelope, PlayerId, Request, RequestEnvelope, Response, ResponseEnvelope,
    RoomId,
};
