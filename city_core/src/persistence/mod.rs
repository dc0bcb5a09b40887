//! Persistence boundary - where progression state is saved and loaded.
//!
//! Progression State is the only thing that survives between sessions.
//! Stores report failures as [`PersistenceError`]; the engine catches them,
//! logs them and keeps playing from memory.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use city_rules::ProgressionState;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("save file I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("save data could not be encoded or decoded: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait ProgressStore {
    /// The saved state, or `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<ProgressionState>, PersistenceError>;

    fn save(&mut self, state: &ProgressionState) -> Result<(), PersistenceError>;
}

/// Pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ProgressStore for JsonFileStore {
    fn load(&self) -> Result<Option<ProgressionState>, PersistenceError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No save file yet");
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let state: ProgressionState = serde_json::from_str(&raw)?;
        Ok(Some(state.normalized()))
    }

    fn save(&mut self, state: &ProgressionState) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let encoded = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, encoded).map_err(|e| self.io_error(e))?;
        debug!(path = %self.path.display(), "Progress saved");
        Ok(())
    }
}

/// Keeps the last save as encoded JSON, so saves go through the same
/// serialization contract as the file store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProgressStore {
    saved: Option<String>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_save(&self) -> bool {
        self.saved.is_some()
    }
}

impl ProgressStore for InMemoryProgressStore {
    fn load(&self) -> Result<Option<ProgressionState>, PersistenceError> {
        self.saved
            .as_deref()
            .map(|raw| Ok(serde_json::from_str::<ProgressionState>(raw)?.normalized()))
            .transpose()
    }

    fn save(&mut self, state: &ProgressionState) -> Result<(), PersistenceError> {
        self.saved = Some(serde_json::to_string(state)?);
        Ok(())
    }
}
