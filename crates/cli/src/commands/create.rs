// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use ds_core::{Record, TalkFields, TodoFields};

use super::print_records;
use crate::error::{Error, Result};
use crate::session::SyncSession;
use crate::sync::Connector;

/// Values from the command line, before they are fitted to a record kind.
#[derive(Debug, Clone, Default)]
pub struct CreateInput {
    pub name: String,
    pub description: String,
    pub speaker_name: Option<String>,
    pub speaker_bio: Option<String>,
}

impl CreateInput {
    pub fn todo_fields(self) -> Result<TodoFields> {
        if self.speaker_name.is_some() || self.speaker_bio.is_some() {
            return Err(Error::InvalidInput(
                "--speaker-name and --speaker-bio only apply to talks".to_string(),
            ));
        }
        Ok(TodoFields::new(self.name, self.description))
    }

    pub fn talk_fields(self) -> TalkFields {
        TalkFields::new(
            self.name,
            self.speaker_name.unwrap_or_default(),
            self.speaker_bio.unwrap_or_default(),
            self.description,
        )
    }
}

/// Create a record and print its fragment. With refresh-on-mutate on, the
/// refreshed list follows after a blank line.
pub async fn run<R: Record, C: Connector>(
    session: &mut SyncSession<R, C>,
    fields: &R::Fields,
    out: &mut impl Write,
) -> Result<()> {
    let record = session.create(fields).await?;
    writeln!(out, "{}", record.fragment())?;

    if !session.options().refresh_on_mutate {
        return Ok(());
    }
    if let Some(message) = session.last_error() {
        eprintln!("warning: created {}, but listing failed: {}", record.id(), message);
        return Ok(());
    }
    writeln!(out)?;
    print_records(out, session.query_view().records())
}

#[cfg(test)]
#[path = "create_tests.rs"]
mod tests;
