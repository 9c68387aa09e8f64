//! Persisted client-side cookie jar.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session store writes the bearer token here on login and clears it on
//! logout; the route guard reads it on every navigation to restore a session
//! after a reload. Access is synchronous because the guard must decide before
//! navigation proceeds.
//!
//! The file-backed jar stores a flat JSON object of name -> value and rewrites
//! the whole file on every change.

#[cfg(test)]
#[path = "cookies_test.rs"]
mod cookies_test;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Name of the cookie holding the bearer token.
pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    #[error("cookie file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("cookie file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable name/value storage shared by the session store and route guard.
pub trait CookieStore: Send + Sync {
    /// Read a cookie value. Empty values read as absent.
    fn get(&self, name: &str) -> Option<String>;

    /// Write a cookie value.
    ///
    /// # Errors
    ///
    /// Returns a [`CookieError`] if the value could not be persisted.
    fn set(&self, name: &str, value: &str) -> Result<(), CookieError>;

    /// Remove a cookie. Removing an absent cookie succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`CookieError`] if the removal could not be persisted.
    fn remove(&self, name: &str) -> Result<(), CookieError>;
}

// =============================================================================
// MEMORY JAR
// =============================================================================

/// Cookie jar that lives for the process only.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryCookieJar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a jar pre-populated with `name = value`.
    #[must_use]
    pub fn with(name: &str, value: &str) -> Self {
        let jar = Self::new();
        lock(&jar.values).insert(name.to_owned(), value.to_owned());
        jar
    }
}

impl CookieStore for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        lock(&self.values).get(name).filter(|v| !v.is_empty()).cloned()
    }

    fn set(&self, name: &str, value: &str) -> Result<(), CookieError> {
        lock(&self.values).insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), CookieError> {
        lock(&self.values).remove(name);
        Ok(())
    }
}

// =============================================================================
// FILE JAR
// =============================================================================

/// Cookie jar persisted as JSON on disk so sessions survive process restarts.
#[derive(Debug)]
pub struct FileCookieJar {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileCookieJar {
    /// Open the jar at `path`. A missing or unparsable file starts an empty
    /// jar; the next write replaces it.
    ///
    /// # Errors
    ///
    /// Returns [`CookieError::Io`] if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CookieError> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "cookie file unreadable, starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values: Mutex::new(values) })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> Result<(), CookieError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(values)?;
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);
        std::fs::write(&staging, raw)?;
        std::fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

impl CookieStore for FileCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        lock(&self.values).get(name).filter(|v| !v.is_empty()).cloned()
    }

    fn set(&self, name: &str, value: &str) -> Result<(), CookieError> {
        let mut values = lock(&self.values);
        values.insert(name.to_owned(), value.to_owned());
        self.flush(&values)
    }

    fn remove(&self, name: &str) -> Result<(), CookieError> {
        let mut values = lock(&self.values);
        if values.remove(name).is_none() && !self.path.exists() {
            return Ok(());
        }
        self.flush(&values)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
