// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use crate::record::{RecordKind, TodoFields};
use serde_json::json;
use yare::parameterized;

#[parameterized(
    init_empty = { ClientMessage::connection_init(None) },
    init_payload = { ClientMessage::connection_init(Some(json!({"x-api-key": "k"}))) },
    subscribe = { ClientMessage::subscribe("1", &Operation::list(RecordKind::Todo)) },
    complete = { ClientMessage::complete("7") },
    ping = { ClientMessage::ping() },
    pong = { ClientMessage::pong() },
)]
fn client_message_roundtrip(msg: ClientMessage) {
    let json = msg.to_json().unwrap();
    let parsed = ClientMessage::from_json(&json).unwrap();
    assert_eq!(msg, parsed);
}

#[test]
fn server_message_next_roundtrip() {
    let msg = ServerMessage::next("1", json!({"listTodos": {"items": []}}));
    let parsed = ServerMessage::from_json(&msg.to_json().unwrap()).unwrap();
    assert_eq!(msg, parsed);
}

#[test]
fn client_message_json_format() {
    let json = ClientMessage::connection_init(None).to_json().unwrap();
    assert_eq!(json, r#"{"type":"connection_init"}"#);

    let fields = TodoFields::new("ain't no lie", "bye bye bye");
    let op = Operation::create(RecordKind::Todo, &fields).unwrap();
    let value: Value = serde_json::from_str(&ClientMessage::subscribe("3", &op).to_json().unwrap()).unwrap();
    assert_eq!(value["type"], "subscribe");
    assert_eq!(value["id"], "3");
    assert_eq!(value["payload"]["operationName"], "CreateTodo");
    assert_eq!(value["payload"]["variables"]["input"]["name"], "ain't no lie");
}

#[test]
fn server_message_parses_backend_frames() {
    let ack = ServerMessage::from_json(r#"{"type":"connection_ack"}"#).unwrap();
    assert_eq!(ack, ServerMessage::connection_ack());

    let next = ServerMessage::from_json(
        r#"{"type":"next","id":"1","payload":{"data":{"createTodo":{"id":"a"}}}}"#,
    )
    .unwrap();
    assert_eq!(next.operation_id(), Some("1"));

    let error = ServerMessage::from_json(
        r#"{"type":"error","id":"2","payload":[{"message":"Unauthorized","errorType":"UnauthorizedException","locations":[{"line":1,"column":2}]}]}"#,
    )
    .unwrap();
    match error {
        ServerMessage::Error { id, payload } => {
            assert_eq!(id, "2");
            assert_eq!(payload[0].message, "Unauthorized");
            assert_eq!(payload[0].error_type.as_deref(), Some("UnauthorizedException"));
            assert_eq!(payload[0].locations.as_ref().unwrap()[0].column, 2);
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[test]
fn execution_result_field() {
    let result = ExecutionResult::data(json!({"createTodo": {"id": "a"}, "other": null}));
    assert_eq!(result.field("createTodo").unwrap()["id"], "a");
    assert!(result.field("other").is_none());
    assert!(result.field("missing").is_none());
    assert!(ExecutionResult::default().field("createTodo").is_none());
}

#[test]
fn execution_result_errors_default_empty() {
    let result: ExecutionResult = serde_json::from_str(r#"{"data":null}"#).unwrap();
    assert!(result.data.is_none());
    assert!(result.errors.is_empty());
}

#[test]
fn graphql_error_display() {
    assert_eq!(GraphqlError::new("boom").to_string(), "boom");
    assert_eq!(
        GraphqlError::new("denied").with_type("Unauthorized").to_string(),
        "denied (Unauthorized)"
    );
}

#[test]
fn operation_id_absent_for_control_messages() {
    assert!(ServerMessage::connection_ack().operation_id().is_none());
    assert!(ServerMessage::ping().operation_id().is_none());
    assert_eq!(ServerMessage::complete("9").operation_id(), Some("9"));
}
