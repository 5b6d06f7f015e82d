// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Backend state management.
//!
//! Holds the in-memory record collections and the broadcast channel that
//! fans creation events out to every connection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::{broadcast, Mutex};
use tracing::info;

use ds_core::protocol::GraphqlError;
use ds_core::{RecordFields, RecordId, RecordKind, Talk, TalkFields, Todo, TodoFields};

/// A record that was just stored.
#[derive(Debug, Clone)]
pub struct Created {
    pub kind: RecordKind,
    pub record: Value,
}

/// Shared backend state.
#[derive(Clone)]
pub struct BackendState {
    inner: Arc<BackendStateInner>,
}

struct BackendStateInner {
    /// Stored records per kind, in creation order.
    records: Mutex<HashMap<RecordKind, Vec<Value>>>,
    /// Key that `connection_init` must carry, if any.
    api_key: Option<String>,
    /// Broadcast channel for creation events.
    broadcast_tx: broadcast::Sender<Created>,
    /// Mixed into generated ids.
    sequence: AtomicU64,
}

impl BackendState {
    pub fn new(api_key: Option<String>) -> Self {
        // Create broadcast channel with reasonable buffer
        let (broadcast_tx, _) = broadcast::channel(1024);
        BackendState {
            inner: Arc::new(BackendStateInner {
                records: Mutex::new(HashMap::new()),
                api_key,
                broadcast_tx,
                sequence: AtomicU64::new(0),
            }),
        }
    }

    /// Checks the `x-api-key` of a `connection_init` payload.
    pub fn authorize(&self, payload: Option<&Value>) -> bool {
        match self.inner.api_key {
            None => true,
            Some(ref expected) => payload
                .and_then(|p| p.get("x-api-key"))
                .and_then(Value::as_str)
                .is_some_and(|key| key == expected),
        }
    }

    /// Subscribe to creation events.
    pub fn subscribe(&self) -> broadcast::Receiver<Created> {
        self.inner.broadcast_tx.subscribe()
    }

    /// All records of a kind, in creation order.
    pub async fn list(&self, kind: RecordKind) -> Vec<Value> {
        let records = self.inner.records.lock().await;
        records.get(&kind).cloned().unwrap_or_default()
    }

    /// Validates the input, stores a new record and broadcasts it.
    pub async fn create(&self, kind: RecordKind, input: &Value) -> Result<Value, Vec<GraphqlError>> {
        let now = Utc::now();
        let sequence = self.inner.sequence.fetch_add(1, Ordering::Relaxed);

        let record = match kind {
            RecordKind::Todo => {
                let fields: TodoFields = decode_input(input)?;
                let id = generate_id(&fields.name, &now, sequence)?;
                encode(&Todo {
                    id,
                    name: fields.name.into(),
                    description: fields.description.into(),
                })?
            }
            RecordKind::Talk => {
                let fields: TalkFields = decode_input(input)?;
                let id = generate_id(&fields.name, &now, sequence)?;
                encode(&Talk {
                    id,
                    name: fields.name.into(),
                    speaker_name: fields.speaker_name.into(),
                    speaker_bio: fields.speaker_bio.into(),
                    description: fields.description.into(),
                })?
            }
        };

        {
            let mut records = self.inner.records.lock().await;
            records.entry(kind).or_default().push(record.clone());
        }
        info!(kind = %kind, id = ?record.get("id"), "record created");

        // Nobody listening is fine
        let _ = self.inner.broadcast_tx.send(Created {
            kind,
            record: record.clone(),
        });
        Ok(record)
    }
}

fn decode_input<F: RecordFields + DeserializeOwned>(input: &Value) -> Result<F, Vec<GraphqlError>> {
    let fields: F = serde_json::from_value(input.clone()).map_err(|e| {
        vec![GraphqlError::new(format!("invalid input: {e}")).with_type("BadRequest")]
    })?;
    fields
        .validate()
        .map_err(|e| vec![GraphqlError::new(e.to_string()).with_type("ValidationError")])?;
    Ok(fields)
}

fn encode<T: serde::Serialize>(record: &T) -> Result<Value, Vec<GraphqlError>> {
    serde_json::to_value(record)
        .map_err(|e| vec![GraphqlError::new(e.to_string()).with_type("InternalFailure")])
}

/// Generate a record id from name, timestamp and sequence number.
/// Format: first 16 hex chars of SHA256(name + timestamp + sequence)
fn generate_id(
    name: &str,
    created_at: &DateTime<Utc>,
    sequence: u64,
) -> Result<RecordId, Vec<GraphqlError>> {
    let input = format!("{}{}{}", name, created_at.to_rfc3339(), sequence);
    let hash = Sha256::digest(input.as_bytes());
    RecordId::try_from(hex::encode(&hash[..8]))
        .map_err(|e| vec![GraphqlError::new(e.to_string()).with_type("InternalFailure")])
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
