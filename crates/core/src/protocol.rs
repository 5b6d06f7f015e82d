// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol messages for client-backend communication.
//!
//! Messages follow the `graphql-transport-ws` sub-protocol:
//! - Client opens with `connection_init`, backend answers `connection_ack`
//! - Client starts an operation with `subscribe`
//! - Backend streams `next` results, then `complete` (or `error`)
//! - Either side may send `complete` to stop an operation early

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Operation;

/// WebSocket sub-protocol name negotiated during the handshake.
pub const SUBPROTOCOL: &str = "graphql-transport-ws";

/// Messages sent from client to backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// First message on every connection.
    ConnectionInit {
        /// Connection parameters, e.g. credentials.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },

    /// Keepalive ping.
    Ping {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },

    /// Answer to a backend ping.
    Pong {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },

    /// Start an operation under a client-chosen id.
    Subscribe {
        id: String,
        payload: SubscribePayload,
    },

    /// Stop the operation with the given id.
    Complete { id: String },
}

/// The operation carried by a `subscribe` message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscribePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
}

impl From<&Operation> for SubscribePayload {
    fn from(op: &Operation) -> Self {
        SubscribePayload {
            operation_name: Some(op.name.clone()),
            query: op.document.clone(),
            variables: op.variables.clone(),
        }
    }
}

/// Messages sent from backend to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Handshake accepted.
    ConnectionAck {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },

    /// Keepalive ping.
    Ping {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },

    /// Answer to a client ping.
    Pong {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },

    /// One execution result for an operation.
    Next {
        id: String,
        payload: ExecutionResult,
    },

    /// The operation failed before producing a result.
    Error {
        id: String,
        payload: Vec<GraphqlError>,
    },

    /// The operation is finished; no more results follow.
    Complete { id: String },
}

/// A GraphQL execution result.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExecutionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphqlError>,
}

impl ExecutionResult {
    /// A result carrying only data.
    pub fn data(data: Value) -> Self {
        ExecutionResult {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    /// Returns the value under the given root field, if present and not null.
    pub fn field(&self, root_field: &str) -> Option<&Value> {
        self.data
            .as_ref()
            .and_then(|data| data.get(root_field))
            .filter(|value| !value.is_null())
    }
}

/// An error reported by the backend, kept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<ErrorLocation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorLocation {
    pub line: u32,
    pub column: u32,
}

impl GraphqlError {
    pub fn new(message: impl Into<String>) -> Self {
        GraphqlError {
            message: message.into(),
            error_type: None,
            path: None,
            locations: None,
            extensions: None,
        }
    }

    /// Sets the backend error classification.
    pub fn with_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }
}

impl fmt::Display for GraphqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error_type {
            Some(ref error_type) => write!(f, "{} ({})", self.message, error_type),
            None => f.write_str(&self.message),
        }
    }
}

impl ClientMessage {
    /// Creates a ConnectionInit message.
    pub fn connection_init(payload: Option<Value>) -> Self {
        ClientMessage::ConnectionInit { payload }
    }

    /// Creates a Subscribe message for the given operation.
    pub fn subscribe(id: impl Into<String>, op: &Operation) -> Self {
        ClientMessage::Subscribe {
            id: id.into(),
            payload: SubscribePayload::from(op),
        }
    }

    /// Creates a Complete message.
    pub fn complete(id: impl Into<String>) -> Self {
        ClientMessage::Complete { id: id.into() }
    }

    /// Creates a Ping message.
    pub fn ping() -> Self {
        ClientMessage::Ping { payload: None }
    }

    /// Creates a Pong message.
    pub fn pong() -> Self {
        ClientMessage::Pong { payload: None }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Creates a ConnectionAck message.
    pub fn connection_ack() -> Self {
        ServerMessage::ConnectionAck { payload: None }
    }

    /// Creates a Next message carrying data.
    pub fn next(id: impl Into<String>, data: Value) -> Self {
        ServerMessage::Next {
            id: id.into(),
            payload: ExecutionResult::data(data),
        }
    }

    /// Creates a Next message carrying a full execution result.
    pub fn next_result(id: impl Into<String>, payload: ExecutionResult) -> Self {
        ServerMessage::Next {
            id: id.into(),
            payload,
        }
    }

    /// Creates an Error message.
    pub fn error(id: impl Into<String>, errors: Vec<GraphqlError>) -> Self {
        ServerMessage::Error {
            id: id.into(),
            payload: errors,
        }
    }

    /// Creates a Complete message.
    pub fn complete(id: impl Into<String>) -> Self {
        ServerMessage::Complete { id: id.into() }
    }

    /// Creates a Ping message.
    pub fn ping() -> Self {
        ServerMessage::Ping { payload: None }
    }

    /// Creates a Pong message.
    pub fn pong() -> Self {
        ServerMessage::Pong { payload: None }
    }

    /// The operation id this message refers to, if any.
    pub fn operation_id(&self) -> Option<&str> {
        match self {
            ServerMessage::Next { id, .. }
            | ServerMessage::Error { id, .. }
            | ServerMessage::Complete { id } => Some(id.as_str()),
            _ => None,
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
