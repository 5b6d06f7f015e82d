// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use super::*;
use yare::parameterized;

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(args)
}

#[test]
fn test_list_defaults_to_todo() {
    let cli = parse(&["datasync", "list"]).unwrap();
    match cli.command {
        Command::List { kind } => assert_eq!(kind.kind, RecordKind::Todo),
        _ => panic!("Expected List command"),
    }
}

#[parameterized(
    todo = { "todo", RecordKind::Todo },
    talk = { "talk", RecordKind::Talk },
    plural = { "talks", RecordKind::Talk },
    upper = { "TODO", RecordKind::Todo },
)]
fn test_kind_values(value: &str, expected: RecordKind) {
    let cli = parse(&["datasync", "watch", "--kind", value]).unwrap();
    match cli.command {
        Command::Watch { kind } => assert_eq!(kind.kind, expected),
        _ => panic!("Expected Watch command"),
    }
}

#[test]
fn test_invalid_kind_is_error() {
    assert!(parse(&["datasync", "list", "--kind", "widget"]).is_err());
}

#[test]
fn test_create_todo() {
    let cli = parse(&[
        "datasync",
        "create",
        "--name",
        "ain't no lie",
        "--description",
        "bye bye bye",
    ])
    .unwrap();
    match cli.command {
        Command::Create {
            kind,
            name,
            description,
            speaker_name,
            speaker_bio,
        } => {
            assert_eq!(kind.kind, RecordKind::Todo);
            assert_eq!(name, "ain't no lie");
            assert_eq!(description, "bye bye bye");
            assert!(speaker_name.is_none());
            assert!(speaker_bio.is_none());
        }
        _ => panic!("Expected Create command"),
    }
}

#[test]
fn test_create_talk() {
    let cli = parse(&[
        "datasync",
        "create",
        "-k",
        "talk",
        "--name",
        "Ownership",
        "--speaker-name",
        "Ferris",
        "--speaker-bio",
        "A crab",
    ])
    .unwrap();
    match cli.command {
        Command::Create {
            kind,
            description,
            speaker_name,
            speaker_bio,
            ..
        } => {
            assert_eq!(kind.kind, RecordKind::Talk);
            assert_eq!(description, "");
            assert_eq!(speaker_name.as_deref(), Some("Ferris"));
            assert_eq!(speaker_bio.as_deref(), Some("A crab"));
        }
        _ => panic!("Expected Create command"),
    }
}

#[test]
fn test_create_requires_name() {
    assert!(parse(&["datasync", "create", "--description", "x"]).is_err());
}
