// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Backend sync module.
//!
//! Provides the GraphQL client used to list, create and watch records.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐     ┌─────────────┐     ┌─────────────┐
//! │     Client     │────►│  Transport  │────►│   GraphQL   │
//! │(DataSyncClient)│◄────│   (trait)   │◄────│   Backend   │
//! └────────────────┘     └─────────────┘     └─────────────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │ Subscription │  (task + bounded channel)
//! └──────────────┘
//! ```
//!
//! # Features
//!
//! - `graphql-transport-ws` over WebSocket for all three operation types
//! - One connection per operation, established through a [`Connector`]
//! - Cancellable subscriptions exposed as a `Stream`
//! - Injectable transport trait for testing

mod client;
mod subscription;
mod transport;

pub use client::{ClientConfig, DataSyncClient, SyncError, SyncResult};
pub use subscription::Subscription;
pub use transport::{Connector, Transport, TransportError, WebSocketConnector, WebSocketTransport};

#[cfg(test)]
pub(crate) mod test_helpers;
