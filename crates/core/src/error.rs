// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for ds-core operations.

use thiserror::Error;

/// All possible errors that can occur in ds-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{field} is required\n  hint: provide a non-blank value")]
    FieldEmpty { field: &'static str },

    #[error("{field} is too long ({actual} bytes, max {max})")]
    FieldTooLong {
        field: &'static str,
        actual: usize,
        max: usize,
    },

    #[error("{field} contains control characters\n  hint: only newlines and tabs are allowed")]
    FieldControlChars { field: &'static str },

    #[error("invalid record id: {0}")]
    InvalidId(String),

    #[error("unknown record kind: '{0}'\n  hint: valid kinds are: todo, talk")]
    UnknownKind(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true for errors raised while checking caller-supplied input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::FieldEmpty { .. } | Error::FieldTooLong { .. } | Error::FieldControlChars { .. }
        )
    }
}

/// A specialized Result type for ds-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
