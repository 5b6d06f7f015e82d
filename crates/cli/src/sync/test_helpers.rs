// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use serde_json::{json, Value};

use ds_core::protocol::{ClientMessage, ServerMessage};
use ds_core::{Talk, Todo};

use super::client::{ClientConfig, DataSyncClient};
use super::transport_tests::{MockConnector, MockPeer};

/// Wire representation of a todo.
pub fn todo_json(id: &str, name: &str, description: &str) -> Value {
    json!({ "id": id, "name": name, "description": description })
}

/// Wire representation of a talk.
pub fn talk_json(id: &str, name: &str, speaker: &str, bio: &str, description: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "speakerName": speaker,
        "speakerBio": bio,
        "description": description,
    })
}

pub fn make_todo(id: &str, name: &str, description: &str) -> Todo {
    serde_json::from_value(todo_json(id, name, description)).unwrap()
}

pub fn make_talk(id: &str, name: &str, speaker: &str, bio: &str, description: &str) -> Talk {
    serde_json::from_value(talk_json(id, name, speaker, bio, description)).unwrap()
}

/// Client config with short timeouts for tests.
pub fn test_config() -> ClientConfig {
    ClientConfig {
        url: "ws://mock".to_string(),
        api_key: Some("test-key".to_string()),
        region: Some("us-east-1".to_string()),
        connect_timeout: Duration::from_secs(2),
        request_timeout: None,
        subscription_buffer: 8,
    }
}

pub fn mock_client() -> DataSyncClient<MockConnector> {
    DataSyncClient::with_connector(test_config(), MockConnector::new())
}

/// Queue a connection that acknowledges the handshake.
pub fn accepted(connector: &MockConnector) -> MockPeer {
    let peer = connector.expect_connection();
    peer.push(ServerMessage::connection_ack());
    peer
}

/// Id of the first `subscribe` the client sent on this connection.
pub fn subscribe_id(peer: &MockPeer) -> Option<String> {
    peer.sent().into_iter().find_map(|msg| match msg {
        ClientMessage::Subscribe { id, .. } => Some(id),
        _ => None,
    })
}

/// Wait until the client has sent a `subscribe` on this connection.
pub async fn wait_for_subscribe(peer: &MockPeer) -> String {
    for _ in 0..200 {
        if let Some(id) = subscribe_id(peer) {
            return id;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("client never sent subscribe");
}

/// Wait until the client has sent `complete` for the given id.
pub async fn wait_for_complete(peer: &MockPeer, id: &str) -> bool {
    for _ in 0..200 {
        let done = peer
            .sent()
            .iter()
            .any(|msg| matches!(msg, ClientMessage::Complete { id: sent } if sent == id));
        if done {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}
