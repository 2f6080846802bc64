//! # Chameleon
//!
//! Game server for Chameleon, the party word game.
//!
//! Players gather in a room; each round the leader starts, one of them is
//! secretly the chameleon and sees only the board, while everyone else
//! also sees the secret word. The rules live in [`chameleon_room`]; this
//! crate puts them behind a WebSocket so browser clients can poll.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chameleon::prelude::*;
//!
//! # async fn run() -> Result<(), ChameleonError> {
//! let server = ChameleonServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;
mod transport;

pub use error::ChameleonError;
pub use handler::dispatch;
pub use server::{ChameleonServer, ChameleonServerBuilder};
pub use transport::{ConnectionId, TransportError};

/// Everything needed to run a server or talk to one.
pub mod prelude {
    pub use crate::{
        dispatch, ChameleonError, ChameleonServer, ChameleonServerBuilder,
    };
    pub use chameleon_protocol::{
        Codec, Envelope, JsonCodec, PlayerId, Request, RequestEnvelope,
        Response, ResponseEnvelope, RoomId,
    };
    pub use chameleon_room::{
        BuiltinCategories, Category, CategoryProvider, Engine, RoomConfig,
        RoomError,
    };
}
