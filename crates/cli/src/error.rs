// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::SyncError;

/// All possible errors that can occur in the datasync client.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to parse config {path}: {message}")]
    ConfigParse { path: String, message: String },

    #[error("invalid backend URL '{0}'\n  hint: the URL must start with ws:// or wss://")]
    InvalidUrl(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Core(#[from] ds_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when a create may have reached the backend despite the error.
    pub fn is_outcome_unknown(&self) -> bool {
        matches!(self, Error::Sync(SyncError::OutcomeUnknown(_)))
    }
}

/// A specialized Result type for datasync operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
