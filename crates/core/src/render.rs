// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Display fragments for records.
//!
//! Rendering is a pure function of the records handed in. Every field is
//! escaped before it is interpolated, so a [`Fragment`] is safe to insert
//! as markup.

use std::fmt;

use crate::record::{Record, Talk, Todo};

/// Markup produced from escaped record fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment(String);

impl Fragment {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `<p>{name} - {description}</p>`
pub fn todo_fragment(todo: &Todo) -> Fragment {
    Fragment(format!(
        "<p>{} - {}</p>",
        todo.name.escaped(),
        todo.description.escaped()
    ))
}

/// Speaker heading, talk title, bio, then description.
pub fn talk_fragment(talk: &Talk) -> Fragment {
    Fragment(format!(
        "<div><h2>{}</h2><h3>{}</h3><h5>{}</h5><p>{}</p></div>",
        talk.speaker_name.escaped(),
        talk.name.escaped(),
        talk.speaker_bio.escaped(),
        talk.description.escaped()
    ))
}

/// Renders one fragment per record, in order. No records, no markup.
pub fn render<R: Record>(records: &[R]) -> String {
    records
        .iter()
        .map(|record| record.fragment().into_string())
        .collect()
}

/// Renders an error message as a fragment.
pub fn error_fragment(message: &str) -> Fragment {
    Fragment(format!(
        "<p class=\"error\">{}</p>",
        crate::text::escape_text(message)
    ))
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
