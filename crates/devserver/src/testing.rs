// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test server utilities for integration testing.
//!
//! Provides a [`TestServer`] that runs the real connection handler on a
//! random local port, for client tests that need a live backend.

use std::io;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::server;
use crate::state::BackendState;

/// A backend that runs on a random port and stops when dropped.
pub struct TestServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    state: BackendState,
}

impl TestServer {
    /// Start a new test server without an API key.
    pub async fn start() -> io::Result<Self> {
        Self::start_with(BackendState::new(None)).await
    }

    /// Start a new test server that requires the given API key.
    pub async fn start_with_api_key(api_key: &str) -> io::Result<Self> {
        Self::start_with(BackendState::new(Some(api_key.to_string()))).await
    }

    pub async fn start_with(state: BackendState) -> io::Result<Self> {
        // Bind to port 0 to get a random available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let serve_state = state.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = server::serve(listener, serve_state) => {
                    if let Err(e) = result {
                        tracing::error!("Test server error: {}", e);
                    }
                }
                _ = shutdown_rx => {}
            }
        });

        Ok(TestServer {
            addr,
            shutdown_tx: Some(shutdown_tx),
            state,
        })
    }

    /// Get the address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get the WebSocket URL for connecting to this server.
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Get access to the server state for verification.
    pub fn state(&self) -> &BackendState {
        &self.state
    }

    /// Stop accepting connections.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.stop();
    }
}
