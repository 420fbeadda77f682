//! API key storage.
//!
//! The key lives in a plain file under `~/.redmark/` with an environment
//! variable fallback. Priority: stored key, then environment.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::consts::default_key_path;

/// Manages the provider API key on disk.
pub struct KeyStore {
    path: PathBuf,
}

impl KeyStore {
    /// Key store at the default location (`~/.redmark/api_key`).
    pub fn new() -> Self {
        Self::at(default_key_path())
    }

    /// Key store at an explicit path. Used by tests.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// The stored key, if any. Whitespace is trimmed.
    pub fn get(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let key = contents.trim().to_string();
                Ok(if key.is_empty() { None } else { Some(key) })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("failed to read API key file"),
        }
    }

    /// Store a key, creating the parent directory if needed.
    pub fn set(&self, key: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("failed to create key directory")?;
        }
        fs::write(&self.path, key.trim()).context("failed to write API key file")?;
        Ok(())
    }

    /// Remove the stored key. Removing a missing key is not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("failed to remove API key file"),
        }
    }

    /// Get the API key. Priority: stored key → environment variable.
    pub fn get_api_key(&self, env_var: &str) -> Result<Option<String>> {
        if let Some(key) = self.get()? {
            return Ok(Some(key));
        }

        if let Ok(key) = std::env::var(env_var)
            && !key.is_empty()
        {
            return Ok(Some(key));
        }

        Ok(None)
    }

    /// Human-readable auth status for the banner.
    pub fn status(&self, env_var: &str) -> String {
        match self.get() {
            Ok(Some(_)) => "key file ✓".to_string(),
            Ok(None) => {
                if std::env::var(env_var)
                    .map(|k| !k.is_empty())
                    .unwrap_or(false)
                {
                    "key (env) ✓".to_string()
                } else {
                    "not configured".to_string()
                }
            }
            Err(_) => "unreadable key file".to_string(),
        }
    }
}

impl Default for KeyStore {
    fn default() -> Self {
        Self::new()
    }
}
