// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by the client are defined here
//! with typed accessor functions. The variable name constants are generated
//! by `build.rs` and live in the [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns the value of `DATASYNC_CONFIG` if set.
pub fn config_path() -> Option<PathBuf> {
    non_empty(vars::DATASYNC_CONFIG).map(PathBuf::from)
}

/// Returns the value of `DATASYNC_URL` if set.
pub fn url() -> Option<String> {
    non_empty(vars::DATASYNC_URL)
}

/// Returns the value of `DATASYNC_API_KEY` if set.
pub fn api_key() -> Option<String> {
    non_empty(vars::DATASYNC_API_KEY)
}

/// Returns the value of `DATASYNC_REGION` if set.
pub fn region() -> Option<String> {
    non_empty(vars::DATASYNC_REGION)
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
