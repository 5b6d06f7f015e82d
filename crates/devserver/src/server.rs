// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket server implementation.
//!
//! Speaks `graphql-transport-ws`: handles the handshake, dispatches
//! operations by name and fans creation events out to subscribers.
//!
//! Close codes follow the protocol:
//! - 4400: malformed message
//! - 4401: operation before `connection_init`
//! - 4403: wrong API key
//! - 4409: duplicate subscription id
//! - 4429: repeated `connection_init`

use std::collections::HashMap;
use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Map, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use ds_core::protocol::{ClientMessage, GraphqlError, ServerMessage, SubscribePayload};
use ds_core::{Operation, OperationKind, RecordKind, SUBPROTOCOL};

use crate::state::{BackendState, Created};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// What the connection loop does in response to a client message.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Reply {
    Send(ServerMessage),
    Close { code: u16, reason: String },
}

impl Reply {
    fn close(code: u16, reason: impl Into<String>) -> Self {
        Reply::Close {
            code,
            reason: reason.into(),
        }
    }
}

/// Protocol state of one connection.
#[derive(Debug, Default)]
pub(crate) struct Connection {
    acknowledged: bool,
    /// Active subscriptions by operation id.
    subscriptions: HashMap<String, RecordKind>,
}

/// Run the WebSocket server on the given address.
pub async fn run(addr: SocketAddr, state: BackendState) -> Result<(), BoxError> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on: {}", addr);
    serve(listener, state).await
}

/// Accept connections on a bound listener until it fails.
pub async fn serve(listener: TcpListener, state: BackendState) -> Result<(), BoxError> {
    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let state = state.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }
}

/// Echo the `graphql-transport-ws` sub-protocol when the client offers it.
fn negotiate_subprotocol(request: &Request, mut response: Response) -> Result<Response, ErrorResponse> {
    let offered = request
        .headers()
        .get(SEC_WEBSOCKET_PROTOCOL)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.split(',').any(|p| p.trim() == SUBPROTOCOL));
    if offered {
        response
            .headers_mut()
            .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(SUBPROTOCOL));
    }
    Ok(response)
}

/// Handle a single WebSocket connection.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: BackendState,
) -> Result<(), BoxError> {
    let ws_stream = tokio_tungstenite::accept_hdr_async(stream, negotiate_subprotocol).await?;
    info!("New WebSocket connection from: {}", peer_addr);

    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    // Subscribe to creation events
    let mut broadcast_rx = state.subscribe();
    let mut conn = Connection::default();

    loop {
        tokio::select! {
            // Handle incoming messages from client
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let mut closing = false;
                        for reply in handle_client_message(text.as_str(), &mut conn, &state).await {
                            match reply {
                                Reply::Send(response) => {
                                    ws_sink.send(Message::Text(response.to_json()?.into())).await?;
                                }
                                Reply::Close { code, reason } => {
                                    info!("Closing {} with {}: {}", peer_addr, code, reason);
                                    let frame = CloseFrame {
                                        code: CloseCode::from(code),
                                        reason: reason.into(),
                                    };
                                    ws_sink.send(Message::Close(Some(frame))).await?;
                                    closing = true;
                                    break;
                                }
                            }
                        }
                        if closing {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Client {} disconnected", peer_addr);
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        ws_sink.send(Message::Pong(data)).await?;
                    }
                    Some(Ok(_)) => {
                        // Ignore other message types (Binary, Pong, Frame)
                    }
                    Some(Err(e)) => {
                        error!("WebSocket error from {}: {}", peer_addr, e);
                        break;
                    }
                    None => {
                        info!("Client {} stream ended", peer_addr);
                        break;
                    }
                }
            }

            // Forward creation events to matching subscriptions
            broadcast = broadcast_rx.recv() => {
                match broadcast {
                    Ok(created) => {
                        for event in forward(&created, &conn) {
                            if let Err(e) = ws_sink.send(Message::Text(event.to_json()?.into())).await {
                                warn!("Failed to send event to {}: {}", peer_addr, e);
                                return Ok(());
                            }
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Client {} lagged by {} events", peer_addr, n);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        }
    }

    info!("Connection closed: {}", peer_addr);
    Ok(())
}

/// Process a client message and return the replies, in order.
pub(crate) async fn handle_client_message(
    text: &str,
    conn: &mut Connection,
    state: &BackendState,
) -> Vec<Reply> {
    let msg = match ClientMessage::from_json(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Invalid message: {}", e);
            return vec![Reply::close(4400, "Invalid message received")];
        }
    };
    debug!("Received message: {:?}", msg);

    match msg {
        ClientMessage::ConnectionInit { payload } => {
            if conn.acknowledged {
                return vec![Reply::close(4429, "Too many initialisation requests")];
            }
            if !state.authorize(payload.as_ref()) {
                return vec![Reply::close(4403, "Forbidden")];
            }
            conn.acknowledged = true;
            vec![Reply::Send(ServerMessage::connection_ack())]
        }
        ClientMessage::Ping { .. } => vec![Reply::Send(ServerMessage::pong())],
        ClientMessage::Pong { .. } => Vec::new(),
        _ if !conn.acknowledged => vec![Reply::close(4401, "Unauthorized")],
        ClientMessage::Subscribe { id, payload } => subscribe(id, payload, conn, state).await,
        ClientMessage::Complete { id } => {
            if conn.subscriptions.remove(&id).is_some() {
                debug!("Subscription {} completed by client", id);
            }
            Vec::new()
        }
    }
}

async fn subscribe(
    id: String,
    payload: SubscribePayload,
    conn: &mut Connection,
    state: &BackendState,
) -> Vec<Reply> {
    if conn.subscriptions.contains_key(&id) {
        return vec![Reply::close(4409, format!("Subscriber for {id} already exists"))];
    }

    let name = payload.operation_name.unwrap_or_default();
    let Some((kind, record_kind)) = Operation::resolve(&name) else {
        let error = GraphqlError::new(format!("Unknown operation: '{name}'"))
            .with_type("UnknownOperation");
        return vec![Reply::Send(ServerMessage::error(id, vec![error]))];
    };
    let root = Operation::root_field_for(kind, record_kind);

    match kind {
        OperationKind::Query => {
            let items = state.list(record_kind).await;
            debug!("{}: {} items", name, items.len());
            let mut connection = Map::new();
            connection.insert("items".to_string(), Value::Array(items));
            vec![
                Reply::Send(ServerMessage::next(id.as_str(), rooted(&root, Value::Object(connection)))),
                Reply::Send(ServerMessage::complete(id)),
            ]
        }
        OperationKind::Mutation => {
            let Some(input) = payload.variables.as_ref().and_then(|v| v.get("input")) else {
                let error = GraphqlError::new("Variable 'input' is required").with_type("BadRequest");
                return vec![Reply::Send(ServerMessage::error(id, vec![error]))];
            };
            match state.create(record_kind, input).await {
                Ok(record) => vec![
                    Reply::Send(ServerMessage::next(id.as_str(), rooted(&root, record))),
                    Reply::Send(ServerMessage::complete(id)),
                ],
                Err(errors) => vec![Reply::Send(ServerMessage::error(id, errors))],
            }
        }
        OperationKind::Subscription => {
            debug!("Subscription {} started for {}", id, record_kind);
            conn.subscriptions.insert(id, record_kind);
            Vec::new()
        }
    }
}

/// Events for every subscription of this connection matching the record kind.
pub(crate) fn forward(created: &Created, conn: &Connection) -> Vec<ServerMessage> {
    let root = Operation::root_field_for(OperationKind::Subscription, created.kind);
    conn.subscriptions
        .iter()
        .filter(|(_, kind)| **kind == created.kind)
        .map(|(id, _)| ServerMessage::next(id.as_str(), rooted(&root, created.record.clone())))
        .collect()
}

fn rooted(root: &str, value: Value) -> Value {
    let mut data = Map::new();
    data.insert(root.to_string(), value);
    Value::Object(data)
}
