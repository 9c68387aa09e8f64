//! Client configuration resolved once at startup.
//!
//! DESIGN
//! ======
//! The only backend-facing setting is the API base URL. It is read from the
//! environment when the application context is built and never changes for
//! the lifetime of that context. `from_lookup` keeps the parsing pure so tests
//! do not have to mutate process-wide environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api/v1";
pub const API_BASE_URL_VAR: &str = "API_BASE_URL";
pub const COOKIE_FILE_VAR: &str = "ACTIVITY_COOKIE_FILE";

/// Errors produced while resolving [`ClientConfig`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The base URL is not an absolute `http(s)` URL.
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Absolute API base URL without a trailing slash.
    pub api_base_url: String,
    /// File backing the persisted cookie jar. `None` keeps cookies in memory.
    pub cookie_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Build a config for an explicit base URL with an in-memory cookie jar.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if `base_url` is not `http(s)`.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self { api_base_url: normalize_base_url(base_url)?, cookie_path: None })
    }

    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `API_BASE_URL`: default `http://localhost:3001/api/v1`
    /// - `ACTIVITY_COOKIE_FILE`: path of the persisted cookie jar
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if `API_BASE_URL` is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the base URL is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(API_BASE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        let api_base_url = normalize_base_url(&raw)?;
        let cookie_path = lookup(COOKIE_FILE_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self { api_base_url, cookie_path })
    }

    /// Join `path` onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_base_url)
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_scheme = trimmed.starts_with("http://") || trimmed.starts_with("https://");
    let has_host = trimmed.split("://").nth(1).is_some_and(|rest| !rest.is_empty());
    if !has_scheme || !has_host {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}
