//! Persisted access-token storage.
//!
//! The publishing service hands out an opaque access token at registration;
//! keeping it on disk lets repeated runs reuse one account instead of
//! registering a throwaway account per process. The record is a single JSON
//! object at a fixed path, read once at session construction and written at
//! most once per successful registration.
//!
//! Failure policy is deliberately asymmetric: a missing or corrupt record is
//! simply "no token" (the session registers afresh), while a failed write is
//! logged and ignored (the in-memory token still serves the current run).
//! Neither ever fails the run.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{debug, warn};

/// On-disk shape of the credential record.
#[derive(Debug, Serialize, Deserialize)]
struct TokenRecord {
    access_token: String,
}

/// A file-backed store for one access token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// A store at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A store at the platform default location,
    /// `<config dir>/snapgraph/credentials.json`.
    pub fn at_default_location() -> Option<Self> {
        dirs::config_dir().map(|d| Self::new(d.join("snapgraph").join("credentials.json")))
    }

    /// The path this store reads and writes.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Read the persisted token.
    ///
    /// Returns `None` for a missing file, unreadable file, unparsable JSON,
    /// or an empty token string. An empty token is indistinguishable from
    /// no token to the service, so it is not trusted.
    pub fn load(&self) -> Option<String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    debug!(path = %self.path.display(), "credential record unreadable: {e}");
                }
                return None;
            }
        };

        let record: TokenRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!(path = %self.path.display(), "credential record corrupt, ignoring: {e}");
                return None;
            }
        };

        if record.access_token.is_empty() {
            return None;
        }

        debug!(path = %self.path.display(), "loaded persisted access token");
        Some(record.access_token)
    }

    /// Write the token, creating parent directories as needed.
    ///
    /// Callers treat a failure as non-fatal: the session keeps its in-memory
    /// token and only the next process pays the cost of re-registering.
    pub fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let record = TokenRecord {
            access_token: token.to_string(),
        };
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, json)?;

        debug!(path = %self.path.display(), "persisted access token");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("credentials.json"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn load_corrupt_file_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(TokenStore::new(&path).load(), None);
    }

    #[test]
    fn load_empty_token_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{"access_token": ""}"#).unwrap();
        assert_eq!(TokenStore::new(&path).load(), None);
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        // Parent directories are created on save.
        let store = TokenStore::new(dir.path().join("nested").join("credentials.json"));
        store.save("d3b07384d113e0ec49eaa6238ad5ff00").unwrap();
        assert_eq!(
            store.load().as_deref(),
            Some("d3b07384d113e0ec49eaa6238ad5ff00")
        );
    }

    #[test]
    fn save_overwrites_previous_token() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("credentials.json"));
        store.save("first").unwrap();
        store.save("second").unwrap();
        assert_eq!(store.load().as_deref(), Some("second"));
    }
}
