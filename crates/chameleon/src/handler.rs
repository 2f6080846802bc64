//! Per-connection handler and request dispatch.
//!
//! Each accepted connection gets its own Tokio task running
//! [`handle_connection`]. The flow is:
//!   1. Receive a frame → decode a [`RequestEnvelope`]
//!   2. [`dispatch`] the body against the shared engine
//!   3. Send the [`Response`] back under the same `seq`
//!
//! There is no session: every request names its player, and clients poll
//! for room and round state.

use std::sync::Arc;

use chameleon_protocol::{
    Codec, PlayerId, ProtocolError, Request, RequestEnvelope, Response,
    ResponseEnvelope,
};
use chameleon_room::{CategoryProvider, Engine, RoomError, Round};

use crate::server::ServerState;
use crate::transport::WebSocketConnection;
use crate::{ChameleonError, TransportError};

/// Handles a single connection from upgrade to close.
pub(crate) async fn handle_connection<P, C>(
    mut conn: WebSocketConnection,
    state: Arc<ServerState<P, C>>,
) -> Result<(), ChameleonError>
where
    P: CategoryProvider,
    C: Codec,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    loop {
        let data =
            match tokio::time::timeout(state.idle_timeout, conn.recv()).await {
                Ok(Ok(Some(data))) => data,
                Ok(Ok(None)) => {
                    tracing::debug!(%conn_id, "connection closed cleanly");
                    return Ok(());
                }
                Ok(Err(e)) => {
                    tracing::debug!(%conn_id, error = %e, "recv error");
                    return Err(e.into());
                }
                Err(_) => {
                    tracing::info!(%conn_id, "connection idle, closing");
                    break;
                }
            };

        let envelope: RequestEnvelope = match state.codec.decode(&data) {
            Ok(env) => env,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode request");
                let reply = ResponseEnvelope {
                    seq: 0,
                    body: error_response(400, format!("invalid request: {e}")),
                };
                conn.send(state.codec.encode(&reply)?).await?;
                continue;
            }
        };

        let kind = envelope.body.kind();
        let body = dispatch(&state.engine, envelope.body);
        tracing::debug!(%conn_id, seq = envelope.seq, kind, "request handled");

        let reply = ResponseEnvelope {
            seq: envelope.seq,
            body,
        };
        conn.send(state.codec.encode(&reply)?).await?;
    }

    match conn.close().await {
        Ok(()) | Err(TransportError::ConnectionClosed) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Runs one request against `engine` and builds the caller's response.
///
/// Never fails: rule violations come back as [`Response::Error`] with the
/// error's status code. For `GetRoundInfo` the secret word is left out
/// when the caller is the chameleon.
pub fn dispatch<P: CategoryProvider>(
    engine: &Engine<P>,
    request: Request,
) -> Response {
    if let Err(e) = request.validate() {
        let message = match e {
            ProtocolError::InvalidMessage(reason) => reason,
            other => other.to_string(),
        };
        tracing::debug!(kind = request.kind(), %message, "request rejected");
        return error_response(400, message);
    }

    let result = match request {
        Request::Ping => Ok(Response::Pong),

        Request::CreateRoom { player } => engine
            .create_room(player)
            .map(|room_id| Response::RoomCreated { room_id }),

        Request::JoinRoom { player, room_id } => engine
            .join_room(player, &room_id)
            .map(|()| Response::Joined { room_id }),

        Request::GetRoomInfo { player, room_id } => {
            engine.room_info(&player, &room_id).map(|snap| {
                Response::RoomInfo {
                    is_leader: snap.is_leader(&player),
                    players: snap.players,
                    current_round: snap.round_number,
                    is_locked: snap.is_locked,
                }
            })
        }

        Request::StartNewRound { player, room_id } => engine
            .start_new_round(&player, &room_id)
            .map(|round_number| Response::RoundStarted { round_number }),

        Request::GetRoundInfo {
            player,
            room_id,
            round_number,
        } => engine
            .round_info(&player, &room_id, round_number)
            .map(|round| round_view(&player, &round)),

        Request::LockRoom { player, room_id } => engine
            .lock_room(&player, &room_id)
            .map(|()| Response::Locked),

        Request::DestroyRoom { player, room_id } => engine
            .destroy_room(&player, &room_id)
            .map(|()| Response::RoomDestroyed),

        Request::Reset => {
            engine.reset();
            Ok(Response::ResetDone)
        }
    };

    result.unwrap_or_else(|e: RoomError| {
        tracing::debug!(code = e.code(), error = %e, "request rejected");
        error_response(e.code(), e.to_string())
    })
}

/// What `player` is allowed to see of `round`.
fn round_view(player: &PlayerId, round: &Round) -> Response {
    let is_chameleon = round.is_chameleon(player);
    Response::RoundInfo {
        is_chameleon,
        words: round.entries().to_vec(),
        secret_word: (!is_chameleon).then(|| round.secret_word().to_owned()),
    }
}

fn error_response(code: u16, message: String) -> Response {
    Response::Error { code, message }
}
