// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the connection handler, directly and over real sockets.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use ds_core::protocol::{ClientMessage, ServerMessage};
use ds_core::{Operation, RecordKind, TodoFields, SUBPROTOCOL};

use crate::server::{forward, handle_client_message, Connection, Reply};
use crate::state::{BackendState, Created};
use crate::testing::TestServer;

fn text(msg: &ClientMessage) -> String {
    msg.to_json().unwrap()
}

async fn acknowledged(state: &BackendState) -> Connection {
    let mut conn = Connection::default();
    let replies = handle_client_message(&text(&ClientMessage::connection_init(None)), &mut conn, state).await;
    assert_eq!(replies, vec![Reply::Send(ServerMessage::connection_ack())]);
    conn
}

fn create_todo(name: &str) -> Operation {
    Operation::create(RecordKind::Todo, &TodoFields::new(name, "")).unwrap()
}

fn sent(replies: &[Reply]) -> Vec<&ServerMessage> {
    replies
        .iter()
        .map(|reply| match reply {
            Reply::Send(msg) => msg,
            Reply::Close { code, .. } => panic!("unexpected close {code}"),
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Direct handler tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_operation_before_init_is_unauthorized() {
    let state = BackendState::new(None);
    let mut conn = Connection::default();

    let msg = ClientMessage::subscribe("1", &Operation::list(RecordKind::Todo));
    let replies = handle_client_message(&text(&msg), &mut conn, &state).await;

    assert!(matches!(&replies[..], [Reply::Close { code: 4401, .. }]));
}

#[tokio::test]
async fn test_ping_before_init_is_answered() {
    let state = BackendState::new(None);
    let mut conn = Connection::default();

    let replies = handle_client_message(&text(&ClientMessage::ping()), &mut conn, &state).await;
    assert_eq!(replies, vec![Reply::Send(ServerMessage::pong())]);
}

#[tokio::test]
async fn test_api_key_checked() {
    let state = BackendState::new(Some("secret".to_string()));

    let mut conn = Connection::default();
    let bad = ClientMessage::connection_init(Some(json!({ "x-api-key": "nope" })));
    let replies = handle_client_message(&text(&bad), &mut conn, &state).await;
    assert!(matches!(&replies[..], [Reply::Close { code: 4403, .. }]));

    let mut conn = Connection::default();
    let good = ClientMessage::connection_init(Some(json!({ "x-api-key": "secret" })));
    let replies = handle_client_message(&text(&good), &mut conn, &state).await;
    assert_eq!(replies, vec![Reply::Send(ServerMessage::connection_ack())]);
}

#[tokio::test]
async fn test_second_init_is_rejected() {
    let state = BackendState::new(None);
    let mut conn = acknowledged(&state).await;

    let replies =
        handle_client_message(&text(&ClientMessage::connection_init(None)), &mut conn, &state).await;
    assert!(matches!(&replies[..], [Reply::Close { code: 4429, .. }]));
}

#[tokio::test]
async fn test_malformed_json_closes() {
    let state = BackendState::new(None);
    let mut conn = Connection::default();

    let replies = handle_client_message("not valid json", &mut conn, &state).await;
    assert!(matches!(&replies[..], [Reply::Close { code: 4400, .. }]));
}

#[tokio::test]
async fn test_list_returns_items_then_complete() {
    let state = BackendState::new(None);
    state.create(RecordKind::Todo, &json!({ "name": "a" })).await.unwrap();
    let mut conn = acknowledged(&state).await;

    let msg = ClientMessage::subscribe("7", &Operation::list(RecordKind::Todo));
    let replies = handle_client_message(&text(&msg), &mut conn, &state).await;
    let msgs = sent(&replies);

    match msgs[0] {
        ServerMessage::Next { id, payload } => {
            assert_eq!(id, "7");
            let items = &payload.data.as_ref().unwrap()["listTodos"]["items"];
            assert_eq!(items.as_array().unwrap().len(), 1);
        }
        other => panic!("expected next, got {other:?}"),
    }
    assert_eq!(*msgs[1], ServerMessage::complete("7"));
}

#[tokio::test]
async fn test_create_returns_record_then_complete() {
    let state = BackendState::new(None);
    let mut conn = acknowledged(&state).await;

    let msg = ClientMessage::subscribe("1", &create_todo("ain't no lie"));
    let replies = handle_client_message(&text(&msg), &mut conn, &state).await;
    let msgs = sent(&replies);

    match msgs[0] {
        ServerMessage::Next { payload, .. } => {
            let todo = payload.field("createTodo").unwrap();
            assert_eq!(todo["name"], "ain't no lie");
            assert!(!todo["id"].as_str().unwrap().is_empty());
        }
        other => panic!("expected next, got {other:?}"),
    }
    assert_eq!(*msgs[1], ServerMessage::complete("1"));
    assert_eq!(state.list(RecordKind::Todo).await.len(), 1);
}

#[tokio::test]
async fn test_create_invalid_input_is_error() {
    let state = BackendState::new(None);
    let mut conn = acknowledged(&state).await;

    let msg = ClientMessage::subscribe("1", &create_todo("   "));
    let replies = handle_client_message(&text(&msg), &mut conn, &state).await;

    match sent(&replies)[..] {
        [ServerMessage::Error { id, payload }] => {
            assert_eq!(id, "1");
            assert_eq!(payload[0].error_type.as_deref(), Some("ValidationError"));
        }
        ref other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_without_input_is_error() {
    let state = BackendState::new(None);
    let mut conn = acknowledged(&state).await;

    let mut op = create_todo("x");
    op.variables = None;
    let replies = handle_client_message(&text(&ClientMessage::subscribe("1", &op)), &mut conn, &state).await;

    assert!(matches!(sent(&replies)[..], [ServerMessage::Error { .. }]));
}

#[tokio::test]
async fn test_unknown_operation_is_error() {
    let state = BackendState::new(None);
    let mut conn = acknowledged(&state).await;

    let mut op = Operation::list(RecordKind::Todo);
    op.name = "DeleteEverything".to_string();
    let replies = handle_client_message(&text(&ClientMessage::subscribe("1", &op)), &mut conn, &state).await;

    match sent(&replies)[..] {
        [ServerMessage::Error { payload, .. }] => {
            assert!(payload[0].message.contains("DeleteEverything"));
        }
        ref other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_subscription_registers_and_forwards_matching_kind() {
    let state = BackendState::new(None);
    let mut conn = acknowledged(&state).await;

    let msg = ClientMessage::subscribe("s", &Operation::on_create(RecordKind::Todo));
    assert!(handle_client_message(&text(&msg), &mut conn, &state).await.is_empty());

    let todo = Created {
        kind: RecordKind::Todo,
        record: json!({ "id": "abc", "name": "x" }),
    };
    let talk = Created {
        kind: RecordKind::Talk,
        record: json!({ "id": "def", "name": "y" }),
    };

    let events = forward(&todo, &conn);
    assert_eq!(
        events,
        vec![ServerMessage::next("s", json!({ "onCreateTodo": { "id": "abc", "name": "x" } }))]
    );
    assert!(forward(&talk, &conn).is_empty());
}

#[tokio::test]
async fn test_duplicate_subscription_id_closes() {
    let state = BackendState::new(None);
    let mut conn = acknowledged(&state).await;

    let msg = text(&ClientMessage::subscribe("s", &Operation::on_create(RecordKind::Todo)));
    handle_client_message(&msg, &mut conn, &state).await;
    let replies = handle_client_message(&msg, &mut conn, &state).await;

    assert!(matches!(&replies[..], [Reply::Close { code: 4409, .. }]));
}

#[tokio::test]
async fn test_complete_removes_subscription() {
    let state = BackendState::new(None);
    let mut conn = acknowledged(&state).await;

    let msg = ClientMessage::subscribe("s", &Operation::on_create(RecordKind::Todo));
    handle_client_message(&text(&msg), &mut conn, &state).await;
    handle_client_message(&text(&ClientMessage::complete("s")), &mut conn, &state).await;

    let created = Created {
        kind: RecordKind::Todo,
        record: json!({ "id": "abc" }),
    };
    assert!(forward(&created, &conn).is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Socket tests
// ─────────────────────────────────────────────────────────────────────────────

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(server: &TestServer) -> Socket {
    let mut request = server.ws_url().into_client_request().unwrap();
    request
        .headers_mut()
        .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(SUBPROTOCOL));
    let (socket, response) = tokio_tungstenite::connect_async(request).await.unwrap();
    assert_eq!(
        response.headers().get(SEC_WEBSOCKET_PROTOCOL).unwrap(),
        SUBPROTOCOL
    );
    socket
}

async fn send(socket: &mut Socket, msg: ClientMessage) {
    socket
        .send(Message::Text(msg.to_json().unwrap().into()))
        .await
        .unwrap();
}

async fn recv(socket: &mut Socket) -> ServerMessage {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("timeout waiting for message");
        match frame {
            Some(Ok(Message::Text(text))) => return ServerMessage::from_json(text.as_str()).unwrap(),
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
            other => panic!("expected text message, got {other:?}"),
        }
    }
}

async fn handshake(socket: &mut Socket) {
    send(socket, ClientMessage::connection_init(None)).await;
    assert_eq!(recv(socket).await, ServerMessage::connection_ack());
}

#[tokio::test]
async fn test_server_starts() {
    let server = TestServer::start().await.unwrap();
    assert!(server.addr().port() > 0);
    server.shutdown();
}

#[tokio::test]
async fn test_creation_fans_out_to_subscribers() {
    let server = TestServer::start().await.unwrap();

    let mut watcher = connect(&server).await;
    handshake(&mut watcher).await;
    send(
        &mut watcher,
        ClientMessage::subscribe("w", &Operation::on_create(RecordKind::Todo)),
    )
    .await;

    let mut writer = connect(&server).await;
    handshake(&mut writer).await;
    // Let the subscription register before creating
    tokio::time::sleep(Duration::from_millis(50)).await;
    send(&mut writer, ClientMessage::subscribe("c", &create_todo("fan out"))).await;

    let created = match recv(&mut writer).await {
        ServerMessage::Next { payload, .. } => payload.field("createTodo").cloned().unwrap(),
        other => panic!("expected next, got {other:?}"),
    };
    assert_eq!(recv(&mut writer).await, ServerMessage::complete("c"));

    match recv(&mut watcher).await {
        ServerMessage::Next { id, payload } => {
            assert_eq!(id, "w");
            assert_eq!(payload.field("onCreateTodo"), Some(&created));
        }
        other => panic!("expected event, got {other:?}"),
    }
}

#[tokio::test]
async fn test_wrong_api_key_closes_with_code() {
    let server = TestServer::start_with_api_key("secret").await.unwrap();
    let mut socket = connect(&server).await;

    send(
        &mut socket,
        ClientMessage::connection_init(Some(json!({ "x-api-key": "wrong" }))),
    )
    .await;

    let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
        .await
        .unwrap();
    match frame {
        Some(Ok(Message::Close(Some(close)))) => {
            assert_eq!(u16::from(close.code), 4403);
            assert_eq!(close.reason.as_str(), "Forbidden");
        }
        other => panic!("expected close frame, got {other:?}"),
    }
}

#[tokio::test]
async fn test_websocket_ping_frame() {
    let server = TestServer::start().await.unwrap();
    let mut socket = connect(&server).await;

    socket
        .send(Message::Ping(vec![1, 2, 3].into()))
        .await
        .unwrap();

    let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
        .await
        .unwrap();
    assert!(matches!(frame, Some(Ok(Message::Pong(_)))));
}

#[tokio::test]
async fn test_list_over_socket() {
    let server = TestServer::start().await.unwrap();
    server
        .state()
        .create(RecordKind::Talk, &json!({ "name": "Rust", "speakerName": "Ferris" }))
        .await
        .unwrap();

    let mut socket = connect(&server).await;
    handshake(&mut socket).await;
    send(&mut socket, ClientMessage::subscribe("1", &Operation::list(RecordKind::Talk))).await;

    match recv(&mut socket).await {
        ServerMessage::Next { payload, .. } => {
            let items: &Value = &payload.field("listTalks").unwrap()["items"];
            assert_eq!(items[0]["speakerName"], "Ferris");
        }
        other => panic!("expected next, got {other:?}"),
    }
}
