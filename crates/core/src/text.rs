// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Untrusted display text.
//!
//! Every string field received from the backend is wrapped in
//! [`UntrustedText`]. The wrapper does not implement `Display`, so a value
//! can only reach markup through [`UntrustedText::escaped`] or an explicit
//! [`UntrustedText::as_untrusted_str`].

use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};

/// A string received from outside the process that has not been escaped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UntrustedText(String);

impl UntrustedText {
    pub fn new(value: impl Into<String>) -> Self {
        UntrustedText(value.into())
    }

    /// Returns the raw, unescaped value.
    pub fn as_untrusted_str(&self) -> &str {
        &self.0
    }

    /// Returns the value escaped for use as element text content.
    pub fn escaped(&self) -> Cow<'_, str> {
        escape_text(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<&str> for UntrustedText {
    fn from(value: &str) -> Self {
        UntrustedText(value.to_string())
    }
}

impl From<String> for UntrustedText {
    fn from(value: String) -> Self {
        UntrustedText(value)
    }
}

impl PartialEq<str> for UntrustedText {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for UntrustedText {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// Nullable GraphQL strings arrive as `null`; treat them as empty text.
impl<'de> Deserialize<'de> for UntrustedText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(UntrustedText(value.unwrap_or_default()))
    }
}

/// Escapes `&`, `<` and `>` so the value cannot open markup inside element
/// text content. Fragment templates never place values inside attributes.
pub fn escape_text(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>']) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
#[path = "text_tests.rs"]
mod tests;
