// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Live subscription handle.
//!
//! A background task owns the connection and forwards decoded events over a
//! bounded channel. The handle is a [`Stream`] of `SyncResult<R>` items that
//! ends when the backend completes the operation, the connection drops, or
//! the handle is cancelled. Undecodable events and malformed frames are
//! yielded as [`SyncError::Protocol`] without ending the stream.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use ds_core::document::OperationKind;
use ds_core::protocol::{ClientMessage, ServerMessage};
use ds_core::Record;

use super::client::{operation_failure, SyncError, SyncResult};
use super::transport::{Transport, TransportError, TransportResult};

/// Handle to a live subscription.
///
/// Dropping the handle cancels the subscription.
#[derive(Debug)]
pub struct Subscription<R> {
    id: String,
    events: Option<mpsc::Receiver<SyncResult<R>>>,
    cancel: Option<oneshot::Sender<()>>,
    /// Set by the background task when it stops for any reason.
    finished: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl<R: Record> Subscription<R> {
    pub(super) fn spawn<T: Transport + 'static>(
        transport: T,
        id: String,
        root_field: String,
        buffer: usize,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel(buffer.max(1));
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let finished = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(pump::<R, T>(
            transport,
            id.clone(),
            root_field,
            events_tx,
            cancel_rx,
            Arc::clone(&finished),
        ));

        Subscription {
            id,
            events: Some(events_rx),
            cancel: Some(cancel_tx),
            finished,
            task: Some(task),
        }
    }
}

impl<R> Subscription<R> {
    /// Operation id used on the wire.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// False once [`cancel`](Self::cancel) was called or the backend side
    /// ended the subscription (complete, error or dropped connection).
    ///
    /// When the stream has yielded `None`, this is already false.
    pub fn is_active(&self) -> bool {
        self.cancel.is_some() && !self.finished.load(Ordering::Acquire)
    }

    /// Stop the subscription. No events are yielded after this returns.
    ///
    /// The background task sends `complete` and closes the connection.
    /// Calling this more than once is a no-op.
    pub fn cancel(&mut self) {
        self.events = None;
        if let Some(cancel) = self.cancel.take() {
            debug!(id = %self.id, "cancelling subscription");
            let _ = cancel.send(());
        }
    }

    /// Cancel and wait for the connection to be closed.
    pub async fn shutdown(mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl<R> Drop for Subscription<R> {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl<R> Stream for Subscription<R> {
    type Item = SyncResult<R>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.events.as_mut() {
            Some(events) => events.poll_recv(cx),
            None => Poll::Ready(None),
        }
    }
}

/// What the pump does with one frame.
enum Step<R> {
    Deliver(SyncResult<R>),
    /// Deliver a final item (if any) and stop without sending `complete`.
    Finish(Option<SyncResult<R>>),
    Pong,
    Skip,
}

async fn pump<R: Record, T: Transport>(
    mut transport: T,
    id: String,
    root_field: String,
    events: mpsc::Sender<SyncResult<R>>,
    mut cancel: oneshot::Receiver<()>,
    finished: Arc<AtomicBool>,
) {
    let mut send_complete = true;

    loop {
        let step = tokio::select! {
            biased;
            _ = &mut cancel => break,
            frame = transport.recv() => classify::<R>(frame, &id, &root_field),
        };

        match step {
            Step::Deliver(item) => {
                let delivered = tokio::select! {
                    biased;
                    _ = &mut cancel => false,
                    sent = events.send(item) => sent.is_ok(),
                };
                if !delivered {
                    break;
                }
            }
            Step::Finish(last) => {
                send_complete = false;
                if let Some(item) = last {
                    let _ = events.send(item).await;
                }
                break;
            }
            Step::Pong => {
                if let Err(e) = transport.send(ClientMessage::pong()).await {
                    send_complete = false;
                    let _ = events.send(Err(failure(e))).await;
                    break;
                }
            }
            Step::Skip => {}
        }
    }

    if send_complete && transport.is_connected() {
        let _ = transport.send(ClientMessage::complete(id.as_str())).await;
    }
    let _ = transport.disconnect().await;
    // Before `events` is dropped, so a consumer seeing the end sees this too
    finished.store(true, Ordering::Release);
    debug!(id = %id, "subscription closed");
    drop(events);
}

fn classify<R: Record>(
    frame: TransportResult<Option<ServerMessage>>,
    id: &str,
    root_field: &str,
) -> Step<R> {
    match frame {
        Ok(Some(ServerMessage::Next { id: msg_id, payload })) if msg_id == id => {
            if !payload.errors.is_empty() {
                return Step::Finish(Some(Err(SyncError::Backend(payload.errors))));
            }
            match payload.field(root_field) {
                Some(value) => Step::Deliver(serde_json::from_value(value.clone()).map_err(|e| {
                    SyncError::Protocol(format!("cannot decode {root_field} event: {e}"))
                })),
                None => {
                    debug!(id, "event without {} data", root_field);
                    Step::Skip
                }
            }
        }
        Ok(Some(ServerMessage::Error { id: msg_id, payload })) if msg_id == id => {
            Step::Finish(Some(Err(SyncError::Backend(payload))))
        }
        Ok(Some(ServerMessage::Complete { id: msg_id })) if msg_id == id => {
            info!(id, "subscription completed by backend");
            Step::Finish(None)
        }
        Ok(Some(ServerMessage::Ping { .. })) => Step::Pong,
        Ok(Some(ServerMessage::Pong { .. })) => Step::Skip,
        Ok(Some(other)) => {
            warn!(id, "ignoring unexpected message: {:?}", other);
            Step::Skip
        }
        Ok(None) => Step::Finish(Some(Err(SyncError::Network(
            TransportError::ConnectionClosed,
        )))),
        Err(TransportError::Malformed(message)) => {
            warn!(id, "undecodable frame: {}", message);
            Step::Deliver(Err(SyncError::Protocol(message)))
        }
        Err(e) => Step::Finish(Some(Err(failure(e)))),
    }
}

fn failure(e: TransportError) -> SyncError {
    operation_failure(OperationKind::Subscription, e)
}
