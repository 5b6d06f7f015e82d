// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync session: the client plus the three display regions it feeds.
//!
//! - The query view holds the latest listing.
//! - The mutation view holds records created through this session.
//! - The subscription view holds records delivered by creation events.
//!
//! A failed operation leaves every view untouched and is kept as the
//! session's visible error.

use tracing::{debug, warn};

use ds_core::render::error_fragment;
use ds_core::Record;

use crate::sync::{Connector, DataSyncClient, Subscription, SyncResult, WebSocketConnector};
use crate::view::RecordView;

/// Behaviour switches for a [`SyncSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Re-list after a successful create instead of appending to the query view.
    pub refresh_on_mutate: bool,
    /// Drop repeated record ids within each view.
    pub dedupe: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            refresh_on_mutate: true,
            dedupe: true,
        }
    }
}

pub struct SyncSession<R: Record, C: Connector = WebSocketConnector> {
    client: DataSyncClient<C>,
    options: SessionOptions,
    query: RecordView<R>,
    mutation: RecordView<R>,
    subscription: RecordView<R>,
    last_error: Option<String>,
}

impl<R: Record, C: Connector> SyncSession<R, C> {
    pub fn new(client: DataSyncClient<C>, options: SessionOptions) -> Self {
        SyncSession {
            client,
            options,
            query: RecordView::new(options.dedupe),
            mutation: RecordView::new(options.dedupe),
            subscription: RecordView::new(options.dedupe),
            last_error: None,
        }
    }

    pub fn client(&self) -> &DataSyncClient<C> {
        &self.client
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn query_view(&self) -> &RecordView<R> {
        &self.query
    }

    pub fn mutation_view(&self) -> &RecordView<R> {
        &self.mutation
    }

    pub fn subscription_view(&self) -> &RecordView<R> {
        &self.subscription
    }

    /// Message of the most recent failure, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The error region: an escaped error fragment, or empty.
    pub fn render_error(&self) -> String {
        self.last_error
            .as_deref()
            .map(|message| error_fragment(message).into_string())
            .unwrap_or_default()
    }

    /// List the collection and replace the query view.
    pub async fn refresh(&mut self) -> SyncResult<()> {
        let result = self.client.list_records::<R>().await;
        let records = self.track(result)?;
        debug!(kind = %R::KIND, count = records.len(), "query view refreshed");
        self.query.replace(records);
        Ok(())
    }

    /// Create a record and update the views.
    ///
    /// The created record is appended to the mutation view. The query view
    /// is then re-listed, or, with `refresh_on_mutate` off, the record is
    /// appended to it directly. A failed re-list after a successful create
    /// is kept as the visible error but does not fail the create.
    pub async fn create(&mut self, fields: &R::Fields) -> SyncResult<R> {
        let result = self.client.create_record::<R>(fields).await;
        let record = self.track(result)?;
        self.mutation.append(record.clone());

        if self.options.refresh_on_mutate {
            if let Err(e) = self.refresh().await {
                warn!(kind = %R::KIND, "refresh after create failed: {}", e);
            }
        } else {
            self.query.append(record.clone());
        }
        Ok(record)
    }

    /// Start watching creation events. Feed delivered records to
    /// [`apply_event`](Self::apply_event).
    pub async fn subscribe(&mut self) -> SyncResult<Subscription<R>> {
        let result = self.client.subscribe_to_creations::<R>().await;
        self.track(result)
    }

    /// Add a subscription-delivered record. Returns false for a duplicate.
    pub fn apply_event(&mut self, record: R) -> bool {
        let added = self.subscription.append(record);
        if !added {
            debug!(kind = %R::KIND, "duplicate creation event dropped");
        }
        added
    }

    /// Record an error delivered outside a session call, e.g. by a stream.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    fn track<T>(&mut self, result: SyncResult<T>) -> SyncResult<T> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Ok(value)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
