//! Persisted connector state.
//!
//! The platform hands each run the JSON object the previous run saved.
//! Here that object lives in a file: loaded before the action, written
//! back after it.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key holding the time of the last successful poll.
pub const LAST_POLL_KEY: &str = "last_poll";

/// State errors.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read state file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write state file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("state file {path} is not a JSON object: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Free-form state object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectorState {
    values: Map<String, Value>,
}

impl ConnectorState {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Time of the last successful poll, if recorded and parseable.
    pub fn last_poll(&self) -> Option<DateTime<Utc>> {
        self.get(LAST_POLL_KEY)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
    }

    pub fn set_last_poll(&mut self, at: DateTime<Utc>) {
        self.insert(LAST_POLL_KEY, Value::String(at.to_rfc3339()));
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }
}

/// File-backed state store.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load state. A missing or empty file is an empty state.
    pub fn load(&self) -> Result<ConnectorState, StateError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ConnectorState::default()),
            Err(source) => {
                return Err(StateError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if contents.trim().is_empty() {
            return Ok(ConnectorState::default());
        }

        let values = serde_json::from_str::<Map<String, Value>>(&contents).map_err(|e| {
            StateError::Parse {
                path: self.path.clone(),
                message: e.to_string(),
            }
        })?;
        Ok(ConnectorState { values })
    }

    /// Write state through a temp file and rename.
    pub fn save(&self, state: &ConnectorState) -> Result<(), StateError> {
        let write_err = |source| StateError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let contents = serde_json::to_string_pretty(&state.values).map_err(|e| StateError::Write {
            path: self.path.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;

        let temp = self.path.with_extension("tmp");
        fs::write(&temp, contents).map_err(write_err)?;
        fs::rename(&temp, &self.path).map_err(write_err)?;
        tracing::debug!(path = %self.path.display(), "Saved state");
        Ok(())
    }
}
