// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shape checks for caller-supplied record fields.

use crate::error::{Error, Result};

// Input length limits
pub const MAX_NAME_LENGTH: usize = 500;
pub const MAX_DESCRIPTION_LENGTH: usize = 100_000;
pub const MAX_SPEAKER_NAME_LENGTH: usize = 200;
pub const MAX_SPEAKER_BIO_LENGTH: usize = 10_000;

/// Validate a required field: non-blank, within `max` bytes, no control
/// characters other than newline and tab.
pub fn validate_required(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::FieldEmpty { field });
    }
    validate_optional(field, value, max)
}

/// Validate a field that may be empty.
pub fn validate_optional(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.len() > max {
        return Err(Error::FieldTooLong {
            field,
            actual: value.len(),
            max,
        });
    }
    if value.chars().any(|c| c.is_control() && c != '\n' && c != '\t') {
        return Err(Error::FieldControlChars { field });
    }
    Ok(())
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
