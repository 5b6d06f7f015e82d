// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ds-devserver: in-memory GraphQL backend for the datasync client.

use clap::Parser;
use std::net::SocketAddr;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ds_devserver::{server, BackendState};

/// ds-devserver: In-memory GraphQL backend
#[derive(Parser, Debug)]
#[command(name = "ds-devserver")]
#[command(about = "In-memory GraphQL backend speaking graphql-transport-ws")]
struct Args {
    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1:7890")]
    bind: SocketAddr,

    /// Require this API key in connection_init
    #[arg(long)]
    api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting ds-devserver");
    info!("  Bind address: {}", args.bind);
    info!(
        "  API key: {}",
        if args.api_key.is_some() { "required" } else { "not required" }
    );

    let state = BackendState::new(args.api_key);
    server::run(args.bind, state).await
}
