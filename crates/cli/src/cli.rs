// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ds_core::RecordKind;

const QUICKSTART_HELP: &str = "\
Get started:
  datasync list                          List todos
  datasync list --kind talk              List talks
  datasync create --name \"Buy milk\"      Create a todo
  datasync watch                         Print todos as they are created";

#[derive(Parser)]
#[command(name = "datasync")]
#[command(about = "List, create and watch records on a GraphQL backend")]
#[command(
    long_about = "List, create and watch records on a GraphQL backend.\n\n\
    Every command opens its own graphql-transport-ws connection. Records are\n\
    printed as HTML fragments with their fields escaped."
)]
#[command(version)]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Config file (default: $DATASYNC_CONFIG or <config dir>/datasync/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Backend URL, overrides config and environment (ws:// or wss://)
    #[arg(long, global = true, value_name = "URL")]
    pub url: Option<String>,

    /// Log protocol traffic to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Record kind selector shared by every command.
#[derive(Args, Debug, Clone, Copy)]
pub struct KindArg {
    /// Record kind (todo, talk)
    #[arg(long, short, default_value = "todo")]
    pub kind: RecordKind,
}

#[derive(Subcommand)]
pub enum Command {
    /// List every record of a kind
    List {
        #[command(flatten)]
        kind: KindArg,
    },

    /// Create a record
    #[command(after_help = "Examples:\n  \
        datasync create --name \"Buy milk\" --description \"2 liters\"\n  \
        datasync create -k talk --name \"Ownership\" --speaker-name Ferris")]
    Create {
        #[command(flatten)]
        kind: KindArg,

        /// Record name
        #[arg(long)]
        name: String,

        /// Record description
        #[arg(long, default_value = "")]
        description: String,

        /// Speaker name (talks only, required for talks)
        #[arg(long)]
        speaker_name: Option<String>,

        /// Speaker bio (talks only)
        #[arg(long)]
        speaker_bio: Option<String>,
    },

    /// Print the current list, then each record as it is created (Ctrl-C stops)
    Watch {
        #[command(flatten)]
        kind: KindArg,
    },
}

#[cfg(test)]
#[path = "cli_tests/mod.rs"]
mod tests;
