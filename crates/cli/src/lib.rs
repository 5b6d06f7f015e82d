// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! datasync - list, create and watch records on a GraphQL backend.
//!
//! This crate provides the client library behind the `datasync` CLI tool.
//! All three operation types travel over `graphql-transport-ws`.
//!
//! # Main Components
//!
//! - [`DataSyncClient`] - query, mutation and subscription operations
//! - [`Subscription`] - cancellable stream of creation events
//! - [`SyncSession`] - a client plus the query, mutation and subscription views
//! - [`Config`] - backend and session configuration
//! - [`Error`] - Error types for all operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use datasync::{Config, DataSyncClient};
//! use ds_core::{Todo, TodoFields};
//!
//! let config = Config::resolve(None)?;
//! let client = DataSyncClient::new(config.client_config());
//!
//! let todos: Vec<Todo> = client.list_records().await?;
//! let created: Todo = client.create_record(&TodoFields::new("Buy milk", "")).await?;
//! let mut events = client.subscribe_to_creations::<Todo>().await?;
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod env;
pub mod error;
pub mod session;
pub mod sync;
pub mod view;

pub use cli::{Cli, Command, KindArg};
pub use config::{Config, Overrides};
pub use error::{Error, Result};
pub use session::{SessionOptions, SyncSession};
pub use sync::{ClientConfig, DataSyncClient, Subscription, SyncError, SyncResult};
pub use view::RecordView;

use ds_core::{Record, RecordKind, Talk, Todo};
use tracing::{debug, warn};

use commands::create::CreateInput;

/// Resolve configuration for a command line: config file, then
/// environment, then `--url`.
pub fn load_config(cli: &Cli) -> Result<Config> {
    resolve_config(cli, &Overrides::from_env())
}

fn resolve_config(cli: &Cli, env: &Overrides) -> Result<Config> {
    let mut config = Config::resolve(cli.config.as_deref())?;
    config.apply(env);
    config.apply(&Overrides {
        url: cli.url.clone(),
        ..Overrides::default()
    });
    config.validate()?;
    Ok(config)
}

fn new_session<R: Record>(config: &Config) -> SyncSession<R> {
    SyncSession::new(
        DataSyncClient::new(config.client_config()),
        config.session_options(),
    )
}

/// Resolves when Ctrl-C is pressed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Run a parsed command line, printing to stdout.
pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    debug!(url = %config.backend.url, "using backend");
    let mut out = std::io::stdout();

    match cli.command {
        Command::List { kind } => match kind.kind {
            RecordKind::Todo => commands::list::run(&mut new_session::<Todo>(&config), &mut out).await,
            RecordKind::Talk => commands::list::run(&mut new_session::<Talk>(&config), &mut out).await,
        },
        Command::Create {
            kind,
            name,
            description,
            speaker_name,
            speaker_bio,
        } => {
            let input = CreateInput {
                name,
                description,
                speaker_name,
                speaker_bio,
            };
            match kind.kind {
                RecordKind::Todo => {
                    let fields = input.todo_fields()?;
                    let mut session = new_session::<Todo>(&config);
                    commands::create::run(&mut session, &fields, &mut out).await
                }
                RecordKind::Talk => {
                    let fields = input.talk_fields();
                    let mut session = new_session::<Talk>(&config);
                    commands::create::run(&mut session, &fields, &mut out).await
                }
            }
        }
        Command::Watch { kind } => match kind.kind {
            RecordKind::Todo => {
                let mut session = new_session::<Todo>(&config);
                commands::watch::run(&mut session, &mut out, interrupted()).await
            }
            RecordKind::Talk => {
                let mut session = new_session::<Talk>(&config);
                commands::watch::run(&mut session, &mut out, interrupted()).await
            }
        },
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
