// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Data sync client for a GraphQL backend.
//!
//! Provides a high-level interface for:
//! - Listing the records of a collection (query)
//! - Creating a record (mutation)
//! - Subscribing to creation events (subscription)
//!
//! Every operation opens its own connection and performs the
//! `graphql-transport-ws` handshake. Queries and mutations close the
//! connection once the result arrives; a subscription keeps it until the
//! returned handle is cancelled. Nothing is retried.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use ds_core::document::{Operation, OperationKind};
use ds_core::protocol::{ClientMessage, ExecutionResult, GraphqlError, ServerMessage};
use ds_core::{Record, RecordFields};

use super::subscription::Subscription;
use super::transport::{Connector, Transport, TransportError, WebSocketConnector};

/// Configuration for the data sync client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket URL of the GraphQL endpoint.
    pub url: String,
    /// API key sent with `connection_init`.
    pub api_key: Option<String>,
    /// Backend region sent with `connection_init`.
    pub region: Option<String>,
    /// Bound on connecting plus the handshake.
    pub connect_timeout: Duration,
    /// Bound on waiting for a query or mutation result. `None` waits forever.
    pub request_timeout: Option<Duration>,
    /// Events buffered per subscription before the backend is back-pressured.
    pub subscription_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            url: "ws://localhost:7890".to_string(),
            api_key: None,
            region: None,
            connect_timeout: Duration::from_secs(5),
            request_timeout: None,
            subscription_buffer: 64,
        }
    }
}

impl ClientConfig {
    /// Payload for the `connection_init` message.
    pub fn init_payload(&self) -> Option<Value> {
        let mut payload = Map::new();
        if let Some(ref key) = self.api_key {
            payload.insert("x-api-key".to_string(), json!(key));
        }
        if let Some(ref region) = self.region {
            payload.insert("region".to_string(), json!(region));
        }
        (!payload.is_empty()).then_some(Value::Object(payload))
    }
}

/// Error type for data sync client operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The backend could not be reached, or the connection failed before
    /// the request was handed over.
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    /// The connection failed after a mutation was sent. The backend may or
    /// may not have applied it.
    #[error("network error after the request was sent: {0}\n  hint: the record may have been created; list records before retrying")]
    OutcomeUnknown(TransportError),

    /// The backend rejected the request. Errors are kept verbatim.
    #[error("backend error: {}", join_errors(.0))]
    Backend(Vec<GraphqlError>),

    /// Input failed shape checks; nothing was sent.
    #[error("invalid input: {0}")]
    Validation(ds_core::Error),

    /// The backend answered with something the client cannot interpret.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl SyncError {
    /// True for both plain network failures and ambiguous mutation outcomes.
    pub fn is_network(&self) -> bool {
        matches!(self, SyncError::Network(_) | SyncError::OutcomeUnknown(_))
    }

    pub fn is_backend(&self) -> bool {
        matches!(self, SyncError::Backend(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SyncError::Validation(_))
    }
}

fn join_errors(errors: &[GraphqlError]) -> String {
    if errors.is_empty() {
        return "unspecified error".to_string();
    }
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for data sync client operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Maps a transport failure during the handshake.
fn handshake_failure(e: TransportError) -> SyncError {
    match e {
        TransportError::Rejected { code, reason } => SyncError::Backend(vec![rejection(code, reason)]),
        TransportError::Malformed(message) => SyncError::Protocol(message),
        other => SyncError::Network(other),
    }
}

/// Close code for an internal failure on the backend side.
const CLOSE_INTERNAL_ERROR: u16 = 4500;

/// Maps a transport failure after an operation was handed to the transport.
///
/// For a mutation, anything that leaves the backend's answer unread is
/// `OutcomeUnknown`: a malformed frame may have been the created record, and
/// an internal-error close may have come after the record was stored.
pub(super) fn operation_failure(kind: OperationKind, e: TransportError) -> SyncError {
    let mutation = kind == OperationKind::Mutation;
    match e {
        TransportError::Rejected { code, reason } if mutation && code == CLOSE_INTERNAL_ERROR => {
            SyncError::OutcomeUnknown(TransportError::Rejected { code, reason })
        }
        TransportError::Rejected { code, reason } => SyncError::Backend(vec![rejection(code, reason)]),
        other if mutation => SyncError::OutcomeUnknown(other),
        TransportError::Malformed(message) => SyncError::Protocol(message),
        other => SyncError::Network(other),
    }
}

fn rejection(code: u16, reason: String) -> GraphqlError {
    let message = if reason.is_empty() {
        format!("connection closed by backend with code {code}")
    } else {
        reason
    };
    GraphqlError::new(message).with_type(format!("Close{code}"))
}

/// Client for one GraphQL backend.
pub struct DataSyncClient<C: Connector = WebSocketConnector> {
    /// Configuration.
    config: ClientConfig,
    /// Produces a transport per operation.
    connector: C,
    /// Source of operation ids.
    next_id: AtomicU64,
}

impl DataSyncClient<WebSocketConnector> {
    /// Create a new client with the default WebSocket transport.
    pub fn new(config: ClientConfig) -> Self {
        DataSyncClient::with_connector(config, WebSocketConnector)
    }
}

impl<C: Connector> DataSyncClient<C> {
    /// Create a new client with a custom connector (for testing).
    pub fn with_connector(config: ClientConfig, connector: C) -> Self {
        DataSyncClient {
            config,
            connector,
            next_id: AtomicU64::new(1),
        }
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Fetch the full collection, in the order the backend returns it.
    ///
    /// Read-only; failures are returned as-is without retry.
    pub async fn list_records<R: Record>(&self) -> SyncResult<Vec<R>> {
        let op = Operation::list(R::KIND);
        let result = self.execute(&op).await?;

        let items = result
            .field(&op.root_field)
            .and_then(|connection| connection.get("items"))
            .ok_or_else(|| SyncError::Protocol(format!("{} returned no items", op.root_field)))?;
        if items.is_null() {
            return Ok(Vec::new());
        }

        let records: Vec<R> = serde_json::from_value(items.clone())
            .map_err(|e| SyncError::Protocol(format!("cannot decode {}: {e}", op.root_field)))?;
        debug!(kind = %R::KIND, count = records.len(), "listed records");
        Ok(records)
    }

    /// Create a record from caller-supplied fields. The backend assigns the id.
    ///
    /// This is a single round trip with no idempotency key. If the
    /// connection fails after the request was sent the error is
    /// [`SyncError::OutcomeUnknown`]: the record may exist, and retrying
    /// blindly can create a duplicate.
    pub async fn create_record<R: Record>(&self, fields: &R::Fields) -> SyncResult<R> {
        fields.validate().map_err(SyncError::Validation)?;
        let op = Operation::create(R::KIND, fields)
            .map_err(|e| SyncError::Protocol(format!("cannot encode input: {e}")))?;
        let result = self.execute(&op).await?;

        let value = result
            .field(&op.root_field)
            .ok_or_else(|| SyncError::Protocol(format!("{} returned no record", op.root_field)))?;
        let record: R = serde_json::from_value(value.clone())
            .map_err(|e| SyncError::Protocol(format!("cannot decode {}: {e}", op.root_field)))?;
        info!(kind = %R::KIND, id = %record.id(), "record created");
        Ok(record)
    }

    /// Open a subscription to creation events.
    ///
    /// Returns once the `subscribe` message has been sent. The protocol has
    /// no acknowledgement for it, so a creation made immediately afterwards
    /// can reach the backend before the subscription is registered and be
    /// missed. Nothing is backfilled, and a dropped connection ends the
    /// stream.
    pub async fn subscribe_to_creations<R: Record>(&self) -> SyncResult<Subscription<R>> {
        let op = Operation::on_create(R::KIND);
        let mut transport = self.open().await?;
        let id = self.next_operation_id();

        if let Err(e) = transport.send(ClientMessage::subscribe(id.as_str(), &op)).await {
            let _ = transport.disconnect().await;
            return Err(operation_failure(op.kind, e));
        }

        info!(operation = %op.name, id = %id, "subscription started");
        Ok(Subscription::spawn(
            transport,
            id,
            op.root_field,
            self.config.subscription_buffer,
        ))
    }

    fn next_operation_id(&self) -> String {
        self.next_id.fetch_add(1, Ordering::Relaxed).to_string()
    }

    /// Connect and complete the handshake within the connect timeout.
    async fn open(&self) -> SyncResult<C::Transport> {
        let mut transport = self.connector.transport();
        let limit = self.config.connect_timeout;

        let outcome = tokio::time::timeout(limit, handshake(&mut transport, &self.config)).await;
        match outcome {
            Ok(Ok(())) => {
                debug!(url = %self.config.url, "connection acknowledged");
                Ok(transport)
            }
            Ok(Err(e)) => {
                let _ = transport.disconnect().await;
                Err(e)
            }
            Err(_) => {
                let _ = transport.disconnect().await;
                Err(SyncError::Network(TransportError::Timeout(limit)))
            }
        }
    }

    /// Run a single-result operation on a fresh connection.
    async fn execute(&self, op: &Operation) -> SyncResult<ExecutionResult> {
        let mut transport = self.open().await?;
        let id = self.next_operation_id();
        debug!(operation = %op.name, id = %id, "sending operation");

        let outcome = match self.config.request_timeout {
            Some(limit) => tokio::time::timeout(limit, exchange(&mut transport, &id, op))
                .await
                .unwrap_or_else(|_| Err(operation_failure(op.kind, TransportError::Timeout(limit)))),
            None => exchange(&mut transport, &id, op).await,
        };
        let _ = transport.disconnect().await;

        let result = outcome?;
        if !result.errors.is_empty() {
            return Err(SyncError::Backend(result.errors));
        }
        Ok(result)
    }
}

async fn handshake<T: Transport>(transport: &mut T, config: &ClientConfig) -> SyncResult<()> {
    transport
        .connect(&config.url)
        .await
        .map_err(handshake_failure)?;
    transport
        .send(ClientMessage::connection_init(config.init_payload()))
        .await
        .map_err(handshake_failure)?;

    loop {
        match transport.recv().await.map_err(handshake_failure)? {
            Some(ServerMessage::ConnectionAck { .. }) => return Ok(()),
            Some(ServerMessage::Ping { .. }) => {
                transport
                    .send(ClientMessage::pong())
                    .await
                    .map_err(handshake_failure)?;
            }
            Some(ServerMessage::Pong { .. }) => {}
            Some(other) => {
                return Err(SyncError::Protocol(format!(
                    "expected connection_ack, got {other:?}"
                )));
            }
            None => return Err(SyncError::Network(TransportError::ConnectionClosed)),
        }
    }
}

/// Send one operation and collect its result.
async fn exchange<T: Transport>(
    transport: &mut T,
    id: &str,
    op: &Operation,
) -> SyncResult<ExecutionResult> {
    transport
        .send(ClientMessage::subscribe(id, op))
        .await
        .map_err(|e| operation_failure(op.kind, e))?;

    let mut result = None;
    loop {
        let msg = transport
            .recv()
            .await
            .map_err(|e| operation_failure(op.kind, e))?;
        match msg {
            Some(ServerMessage::Next { id: msg_id, payload }) if msg_id == id => {
                result = Some(payload);
            }
            Some(ServerMessage::Complete { id: msg_id }) if msg_id == id => break,
            Some(ServerMessage::Error { id: msg_id, payload }) if msg_id == id => {
                return Err(SyncError::Backend(payload));
            }
            Some(ServerMessage::Ping { .. }) => {
                transport
                    .send(ClientMessage::pong())
                    .await
                    .map_err(|e| operation_failure(op.kind, e))?;
            }
            Some(ServerMessage::Pong { .. }) => {}
            Some(other) => {
                warn!(operation = %op.name, "ignoring unexpected message: {:?}", other);
            }
            None if result.is_some() => break,
            None => return Err(operation_failure(op.kind, TransportError::ConnectionClosed)),
        }
    }

    result.ok_or_else(|| SyncError::Protocol(format!("{} completed without a result", op.name)))
}
