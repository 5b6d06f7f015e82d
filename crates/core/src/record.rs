// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Record types stored by the backend.
//!
//! Two shapes are supported, [`Todo`] and [`Talk`]. Both implement
//! [`Record`], which is what the client and renderer are generic over.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::render::{self, Fragment};
use crate::text::UntrustedText;
use crate::validate::{
    validate_optional, validate_required, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH,
    MAX_SPEAKER_BIO_LENGTH, MAX_SPEAKER_NAME_LENGTH,
};

/// The record variants known to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Todo,
    Talk,
}

impl RecordKind {
    /// Every supported kind.
    pub const ALL: [RecordKind; 2] = [RecordKind::Todo, RecordKind::Talk];

    /// The backend type name, e.g. `Todo`.
    pub fn type_name(self) -> &'static str {
        match self {
            RecordKind::Todo => "Todo",
            RecordKind::Talk => "Talk",
        }
    }

    /// Fields requested in every selection set, in template order.
    pub fn selection(self) -> &'static [&'static str] {
        match self {
            RecordKind::Todo => &["id", "name", "description"],
            RecordKind::Talk => &["id", "name", "speakerName", "speakerBio", "description"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Todo => "todo",
            RecordKind::Talk => "talk",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "todo" | "todos" => Ok(RecordKind::Todo),
            "talk" | "talks" => Ok(RecordKind::Talk),
            _ => Err(Error::UnknownKind(s.to_string())),
        }
    }
}

/// Backend-assigned record identifier. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RecordId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        if value.trim().is_empty() {
            return Err(Error::InvalidId("id must not be empty".to_string()));
        }
        Ok(RecordId(value))
    }
}

impl TryFrom<&str> for RecordId {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        RecordId::try_from(value.to_string())
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record as returned by the backend.
pub trait Record: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static {
    /// Input accepted by the create mutation for this record.
    type Fields: RecordFields;

    const KIND: RecordKind;

    fn id(&self) -> &RecordId;

    /// The display fragment for this record, with every field escaped.
    fn fragment(&self) -> Fragment;

    /// Whether this record carries exactly the given input values.
    fn matches(&self, fields: &Self::Fields) -> bool;
}

/// Caller-supplied values for a create mutation.
pub trait RecordFields: Serialize + Clone + fmt::Debug + Send + Sync + 'static {
    /// Shape checks performed before anything is sent.
    fn validate(&self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: RecordId,
    #[serde(default)]
    pub name: UntrustedText,
    #[serde(default)]
    pub description: UntrustedText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoFields {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl TodoFields {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        TodoFields {
            name: name.into(),
            description: description.into(),
        }
    }
}

impl RecordFields for TodoFields {
    fn validate(&self) -> Result<()> {
        validate_required("Name", &self.name, MAX_NAME_LENGTH)?;
        validate_optional("Description", &self.description, MAX_DESCRIPTION_LENGTH)
    }
}

impl Record for Todo {
    type Fields = TodoFields;

    const KIND: RecordKind = RecordKind::Todo;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn fragment(&self) -> Fragment {
        render::todo_fragment(self)
    }

    fn matches(&self, fields: &TodoFields) -> bool {
        self.name == *fields.name && self.description == *fields.description
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Talk {
    pub id: RecordId,
    #[serde(default)]
    pub name: UntrustedText,
    #[serde(default)]
    pub speaker_name: UntrustedText,
    #[serde(default)]
    pub speaker_bio: UntrustedText,
    #[serde(default)]
    pub description: UntrustedText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TalkFields {
    pub name: String,
    pub speaker_name: String,
    #[serde(default)]
    pub speaker_bio: String,
    #[serde(default)]
    pub description: String,
}

impl TalkFields {
    pub fn new(
        name: impl Into<String>,
        speaker_name: impl Into<String>,
        speaker_bio: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        TalkFields {
            name: name.into(),
            speaker_name: speaker_name.into(),
            speaker_bio: speaker_bio.into(),
            description: description.into(),
        }
    }
}

impl RecordFields for TalkFields {
    fn validate(&self) -> Result<()> {
        validate_required("Name", &self.name, MAX_NAME_LENGTH)?;
        validate_required("Speaker name", &self.speaker_name, MAX_SPEAKER_NAME_LENGTH)?;
        validate_optional("Speaker bio", &self.speaker_bio, MAX_SPEAKER_BIO_LENGTH)?;
        validate_optional("Description", &self.description, MAX_DESCRIPTION_LENGTH)
    }
}

impl Record for Talk {
    type Fields = TalkFields;

    const KIND: RecordKind = RecordKind::Talk;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn fragment(&self) -> Fragment {
        render::talk_fragment(self)
    }

    fn matches(&self, fields: &TalkFields) -> bool {
        self.name == *fields.name
            && self.speaker_name == *fields.speaker_name
            && self.speaker_bio == *fields.speaker_bio
            && self.description == *fields.description
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
