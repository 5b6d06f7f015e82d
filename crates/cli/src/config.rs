// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration management.
//!
//! Configuration is a TOML file with two tables:
//! - `[backend]`: endpoint URL, credentials and timeouts
//! - `[sync]`: session behaviour (refresh after create, de-duplication,
//!   subscription buffering)
//!
//! The file is found via `--config`, then `DATASYNC_CONFIG`, then
//! `<config_dir>/datasync/config.toml`. Without a file the defaults apply.
//! Environment overrides are applied on top, and `--url` last.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env;
use crate::error::{Error, Result};
use crate::session::SessionOptions;
use crate::sync::ClientConfig;

const CONFIG_DIR_NAME: &str = "datasync";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub sync: SyncSettings,
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// GraphQL endpoint, `ws://...` or `wss://...`.
    #[serde(default = "default_url")]
    pub url: String,
    /// API key sent in `connection_init`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Backend region sent in `connection_init`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Max time to connect and complete the handshake in seconds (default: 5).
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Max time to wait for a query or mutation result in seconds
    /// (default: 0). 0 = wait indefinitely.
    #[serde(default)]
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            url: default_url(),
            api_key: None,
            region: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: 0,
        }
    }
}

/// Session behaviour settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Re-list after a successful create (default: true).
    #[serde(default = "default_true")]
    pub refresh_on_mutate: bool,
    /// Drop repeated record ids within a view (default: true).
    #[serde(default = "default_true")]
    pub dedupe: bool,
    /// Events buffered per subscription (default: 64).
    #[serde(default = "default_subscription_buffer")]
    pub subscription_buffer: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            refresh_on_mutate: true,
            dedupe: true,
            subscription_buffer: default_subscription_buffer(),
        }
    }
}

fn default_url() -> String {
    "ws://127.0.0.1:7890".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_subscription_buffer() -> usize {
    64
}

/// Values that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub region: Option<String>,
}

impl Overrides {
    /// Reads `DATASYNC_URL`, `DATASYNC_API_KEY` and `DATASYNC_REGION`.
    pub fn from_env() -> Self {
        Overrides {
            url: env::url(),
            api_key: env::api_key(),
            region: env::region(),
        }
    }
}

impl Config {
    /// Loads configuration from the given file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse {
            path: path.display().to_string(),
            message: e.message().to_string(),
        })
    }

    /// Finds and loads the configuration file, falling back to defaults.
    ///
    /// An explicitly named file (flag or environment) must exist; the
    /// per-user default file is optional.
    pub fn resolve(cli_path: Option<&Path>) -> Result<Self> {
        Self::resolve_from(cli_path, env::config_path(), default_path())
    }

    pub(crate) fn resolve_from(
        cli_path: Option<&Path>,
        env_path: Option<PathBuf>,
        default_path: Option<PathBuf>,
    ) -> Result<Self> {
        if let Some(path) = cli_path {
            return Self::load(path);
        }
        if let Some(path) = env_path {
            return Self::load(&path);
        }
        match default_path {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Config::default()),
        }
    }

    /// Applies overrides; set values replace the file's values.
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(ref url) = overrides.url {
            self.backend.url = url.clone();
        }
        if let Some(ref key) = overrides.api_key {
            self.backend.api_key = Some(key.clone());
        }
        if let Some(ref region) = overrides.region {
            self.backend.region = Some(region.clone());
        }
    }

    /// Checks values the client cannot work with.
    pub fn validate(&self) -> Result<()> {
        validate_url(&self.backend.url)?;
        if self.backend.connect_timeout_secs == 0 {
            return Err(Error::Config(
                "backend.connect_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.sync.subscription_buffer == 0 {
            return Err(Error::Config(
                "sync.subscription_buffer must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            url: self.backend.url.clone(),
            api_key: self.backend.api_key.clone(),
            region: self.backend.region.clone(),
            connect_timeout: Duration::from_secs(self.backend.connect_timeout_secs),
            request_timeout: match self.backend.request_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            subscription_buffer: self.sync.subscription_buffer,
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            refresh_on_mutate: self.sync.refresh_on_mutate,
            dedupe: self.sync.dedupe,
        }
    }
}

/// Per-user config file, `<config_dir>/datasync/config.toml`.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Validates that a backend URL is a WebSocket URL with a host.
pub fn validate_url(url: &str) -> Result<()> {
    let rest = url
        .strip_prefix("wss://")
        .or_else(|| url.strip_prefix("ws://"))
        .ok_or_else(|| Error::InvalidUrl(url.to_string()))?;
    if rest.is_empty() || rest.starts_with('/') {
        return Err(Error::InvalidUrl(url.to_string()));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
