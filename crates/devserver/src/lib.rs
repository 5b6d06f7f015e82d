// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ds-devserver: in-memory GraphQL backend for developing and testing the
//! datasync client.
//!
//! Serves the list, create and on-create operations for every record kind
//! over `graphql-transport-ws`. Records live in memory only.

pub mod server;
pub mod state;
mod testing;

pub use state::{BackendState, Created};
pub use testing::TestServer;

#[cfg(test)]
mod server_tests;
