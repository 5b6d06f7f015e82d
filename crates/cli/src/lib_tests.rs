// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

//! Tests for command line configuration resolution.
//!
//! Commands themselves are tested against a mock connector in
//! `commands/*_tests.rs` and against the development backend in
//! `tests/end_to_end.rs`.

use super::*;
use clap::Parser;
use std::fs;
use tempfile::TempDir;

fn cli_with_config(dir: &TempDir, content: &str, extra: &[&str]) -> Cli {
    let path = dir.path().join("config.toml");
    fs::write(&path, content).unwrap();
    let mut args = vec!["datasync", "--config", path.to_str().unwrap()];
    args.extend_from_slice(extra);
    args.push("list");
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn test_config_file_is_used() {
    let temp = TempDir::new().unwrap();
    let cli = cli_with_config(&temp, "[backend]\nurl = \"ws://file:1\"\n", &[]);

    let config = resolve_config(&cli, &Overrides::default()).unwrap();
    assert_eq!(config.backend.url, "ws://file:1");
}

#[test]
fn test_env_overrides_file() {
    let temp = TempDir::new().unwrap();
    let cli = cli_with_config(&temp, "[backend]\nurl = \"ws://file:1\"\n", &[]);
    let env = Overrides {
        url: Some("ws://env:2".to_string()),
        api_key: Some("env-key".to_string()),
        region: None,
    };

    let config = resolve_config(&cli, &env).unwrap();
    assert_eq!(config.backend.url, "ws://env:2");
    assert_eq!(config.backend.api_key.as_deref(), Some("env-key"));
}

#[test]
fn test_url_flag_wins() {
    let temp = TempDir::new().unwrap();
    let cli = cli_with_config(
        &temp,
        "[backend]\nurl = \"ws://file:1\"\n",
        &["--url", "wss://flag:3"],
    );
    let env = Overrides {
        url: Some("ws://env:2".to_string()),
        ..Overrides::default()
    };

    let config = resolve_config(&cli, &env).unwrap();
    assert_eq!(config.backend.url, "wss://flag:3");
}

#[test]
fn test_invalid_url_is_rejected() {
    let temp = TempDir::new().unwrap();
    let cli = cli_with_config(&temp, "", &["--url", "http://nope"]);

    let err = resolve_config(&cli, &Overrides::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)));
}

#[test]
fn test_session_follows_config() {
    let temp = TempDir::new().unwrap();
    let cli = cli_with_config(&temp, "[sync]\nrefresh_on_mutate = false\n", &[]);

    let config = resolve_config(&cli, &Overrides::default()).unwrap();
    let session = new_session::<Todo>(&config);
    assert!(!session.options().refresh_on_mutate);
    assert_eq!(session.client().config().url, config.backend.url);
}
