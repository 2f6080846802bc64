//! Integration tests for the Chameleon server: a real listener, real
//! WebSocket clients, and the full polling flow.

use std::time::Duration;

use chameleon::prelude::*;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns the address.
async fn start_server() -> String {
    start_with(ChameleonServer::builder().bind("127.0.0.1:0")).await
}

async fn start_with<P: CategoryProvider>(
    builder: ChameleonServerBuilder<P>,
) -> String {
    let server = builder.build().await.expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

fn encode_request(seq: u64, body: Request) -> Message {
    let text = serde_json::to_string(&Envelope { seq, body }).expect("encode");
    Message::Text(text.into())
}

async fn recv_response(ws: &mut ClientWs) -> ResponseEnvelope {
    let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("response within 2s")
        .expect("stream open")
        .expect("recv");
    assert!(msg.is_text(), "responses are text frames, got {msg:?}");
    serde_json::from_slice(&msg.into_data()).expect("decode")
}

/// Sends one request and waits for its response body.
async fn call(ws: &mut ClientWs, seq: u64, body: Request) -> Response {
    ws.send(encode_request(seq, body)).await.expect("send");
    let reply = recv_response(ws).await;
    assert_eq!(reply.seq, seq, "server must echo seq");
    reply.body
}

fn pid(name: &str) -> PlayerId {
    PlayerId::from(name)
}

async fn create_room(ws: &mut ClientWs, player: &str) -> RoomId {
    match call(ws, 1, Request::CreateRoom { player: pid(player) }).await {
        Response::RoomCreated { room_id } => room_id,
        other => panic!("expected RoomCreated, got {other:?}"),
    }
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_ping() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    assert_eq!(call(&mut ws, 7, Request::Ping).await, Response::Pong);
}

#[tokio::test]
async fn test_full_game_over_websocket() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;

    let room = create_room(&mut alice, "alice").await;
    assert_eq!(room.as_str().len(), 4);

    let joined = call(
        &mut bob,
        2,
        Request::JoinRoom {
            player: pid("bob"),
            room_id: room.clone(),
        },
    )
    .await;
    assert_eq!(joined, Response::Joined { room_id: room.clone() });

    let started = call(
        &mut alice,
        3,
        Request::StartNewRound {
            player: pid("alice"),
            room_id: room.clone(),
        },
    )
    .await;
    assert_eq!(started, Response::RoundStarted { round_number: 1 });

    // Polling from a separate connection sees the same room.
    let info = call(
        &mut bob,
        4,
        Request::GetRoomInfo {
            player: pid("bob"),
            room_id: room.clone(),
        },
    )
    .await;
    assert_eq!(
        info,
        Response::RoomInfo {
            is_leader: false,
            players: vec![pid("alice"), pid("bob")],
            current_round: 1,
            is_locked: true,
        }
    );

    let mut chameleons = 0;
    for (ws, name) in [(&mut alice, "alice"), (&mut bob, "bob")] {
        let resp = call(
            ws,
            5,
            Request::GetRoundInfo {
                player: pid(name),
                room_id: room.clone(),
                round_number: 1,
            },
        )
        .await;
        let Response::RoundInfo {
            is_chameleon,
            words,
            secret_word,
        } = resp
        else {
            panic!("expected RoundInfo, got {resp:?}");
        };
        assert_eq!(words.len(), 16);
        if is_chameleon {
            chameleons += 1;
            assert!(secret_word.is_none());
        } else {
            assert!(words.contains(&secret_word.expect("secret for non-chameleon")));
        }
    }
    assert_eq!(chameleons, 1);

    let destroyed = call(
        &mut alice,
        6,
        Request::DestroyRoom {
            player: pid("alice"),
            room_id: room.clone(),
        },
    )
    .await;
    assert_eq!(destroyed, Response::RoomDestroyed);

    let after = call(
        &mut bob,
        7,
        Request::GetRoomInfo {
            player: pid("bob"),
            room_id: room,
        },
    )
    .await;
    assert!(matches!(after, Response::Error { code: 403, .. }));
}

#[tokio::test]
async fn test_chameleon_raw_json_has_no_secret_word() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    let room = create_room(&mut ws, "solo").await;
    call(
        &mut ws,
        2,
        Request::StartNewRound {
            player: pid("solo"),
            room_id: room.clone(),
        },
    )
    .await;

    // A lone player is always the chameleon.
    ws.send(encode_request(
        3,
        Request::GetRoundInfo {
            player: pid("solo"),
            room_id: room,
            round_number: 1,
        },
    ))
    .await
    .expect("send");
    let msg = ws.next().await.unwrap().expect("recv");
    let raw: serde_json::Value =
        serde_json::from_slice(&msg.into_data()).expect("json");

    assert_eq!(raw["body"]["type"], "RoundInfo");
    assert_eq!(raw["body"]["is_chameleon"], true);
    assert!(raw["body"].get("secret_word").is_none(), "leaked: {raw}");
}

#[tokio::test]
async fn test_errors_carry_status_codes() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;
    let room = create_room(&mut alice, "alice").await;

    let missing = call(
        &mut bob,
        1,
        Request::JoinRoom {
            player: pid("bob"),
            room_id: RoomId::from("nope"),
        },
    )
    .await;
    call(
        &mut bob,
        2,
        Request::JoinRoom {
            player: pid("bob"),
            room_id: room.clone(),
        },
    )
    .await;
    let not_leader = call(
        &mut bob,
        3,
        Request::LockRoom {
            player: pid("bob"),
            room_id: room.clone(),
        },
    )
    .await;
    let twice = call(
        &mut bob,
        4,
        Request::JoinRoom {
            player: pid("bob"),
            room_id: room.clone(),
        },
    )
    .await;
    let no_round = call(
        &mut bob,
        5,
        Request::GetRoundInfo {
            player: pid("bob"),
            room_id: room,
            round_number: 0,
        },
    )
    .await;

    assert!(matches!(missing, Response::Error { code: 404, .. }));
    assert!(matches!(not_leader, Response::Error { code: 403, .. }));
    assert!(matches!(twice, Response::Error { code: 409, .. }));
    assert!(matches!(no_round, Response::Error { code: 404, .. }));
}

#[tokio::test]
async fn test_empty_player_is_rejected() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let resp = call(&mut ws, 1, Request::CreateRoom { player: pid("") }).await;

    assert_eq!(
        resp,
        Response::Error {
            code: 400,
            message: "player is required".into()
        }
    );
}

#[tokio::test]
async fn test_malformed_request_gets_400_and_connection_survives() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    ws.send(Message::Text("not json".into())).await.expect("send");
    let reply = recv_response(&mut ws).await;
    assert_eq!(reply.seq, 0);
    assert!(matches!(reply.body, Response::Error { code: 400, .. }));

    ws.send(Message::Binary(b"{\"seq\":1,\"body\":{\"type\":\"Nope\"}}".to_vec().into()))
        .await
        .expect("send");
    let reply = recv_response(&mut ws).await;
    assert!(matches!(reply.body, Response::Error { code: 400, .. }));

    // Still serving.
    assert_eq!(call(&mut ws, 2, Request::Ping).await, Response::Pong);
}

#[tokio::test]
async fn test_reset_drops_every_room() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    let room = create_room(&mut ws, "alice").await;

    assert_eq!(call(&mut ws, 2, Request::Reset).await, Response::ResetDone);

    let info = call(
        &mut ws,
        3,
        Request::GetRoomInfo {
            player: pid("alice"),
            room_id: room,
        },
    )
    .await;
    assert!(matches!(info, Response::Error { code: 403, .. }));

    // alice is free to lead a new room.
    create_room(&mut ws, "alice").await;
}

#[tokio::test]
async fn test_custom_room_config_and_provider() {
    let builder = ChameleonServer::builder()
        .bind("127.0.0.1:0")
        .room_config(RoomConfig {
            id_length: 8,
            lock_on_round_start: false,
        })
        .category_provider(Category::new("Colors", ["Red", "Blue"]).unwrap());
    let addr = start_with(builder).await;
    let mut alice = connect(&addr).await;
    let mut late = connect(&addr).await;

    let room = create_room(&mut alice, "alice").await;
    assert_eq!(room.as_str().len(), 8);
    call(
        &mut alice,
        2,
        Request::StartNewRound {
            player: pid("alice"),
            room_id: room.clone(),
        },
    )
    .await;

    // The room stays open after a round under this config.
    let joined = call(
        &mut late,
        3,
        Request::JoinRoom {
            player: pid("late"),
            room_id: room.clone(),
        },
    )
    .await;
    assert_eq!(joined, Response::Joined { room_id: room.clone() });

    let resp = call(
        &mut alice,
        4,
        Request::GetRoundInfo {
            player: pid("alice"),
            room_id: room,
            round_number: 1,
        },
    )
    .await;
    match resp {
        Response::RoundInfo { words, .. } => {
            assert_eq!(words, vec!["Red".to_string(), "Blue".to_string()]);
        }
        other => panic!("expected RoundInfo, got {other:?}"),
    }
}

#[tokio::test]
async fn test_idle_connection_is_closed() {
    let builder = ChameleonServer::builder()
        .bind("127.0.0.1:0")
        .idle_timeout(Duration::from_millis(50));
    let addr = start_with(builder).await;
    let mut ws = connect(&addr).await;

    let result = tokio::time::timeout(Duration::from_secs(2), ws.next()).await;

    match result {
        Ok(Some(Ok(Message::Close(_)))) | Ok(None) => {} // expected
        Ok(Some(Err(_))) => {}                           // also fine
        other => panic!("expected close, got {other:?}"),
    }
}

#[tokio::test]
async fn test_concurrent_clients_join_one_room() {
    let addr = start_server().await;
    let mut leader = connect(&addr).await;
    let room = create_room(&mut leader, "leader").await;

    let mut tasks = Vec::new();
    for i in 0..8 {
        let addr = addr.clone();
        let room = room.clone();
        tasks.push(tokio::spawn(async move {
            let mut ws = connect(&addr).await;
            call(
                &mut ws,
                1,
                Request::JoinRoom {
                    player: PlayerId::from(format!("p{i}")),
                    room_id: room,
                },
            )
            .await
        }));
    }
    for task in tasks {
        assert!(matches!(task.await.unwrap(), Response::Joined { .. }));
    }

    let info = call(
        &mut leader,
        2,
        Request::GetRoomInfo {
            player: pid("leader"),
            room_id: room,
        },
    )
    .await;
    match info {
        Response::RoomInfo {
            is_leader, players, ..
        } => {
            assert!(is_leader);
            assert_eq!(players.len(), 9);
            assert_eq!(players[0], pid("leader"));
        }
        other => panic!("expected RoomInfo, got {other:?}"),
    }
}
