//! JSON file storage for rotation state
//!
//! State lives in `.rota/state.json` as one pretty-printed document.
//! Reads take a shared lock. Writers first take an exclusive lock on a
//! `state.json.lock` sidecar, then write a temp file and rename it over the
//! original, so readers never see a torn document and overlapping saves
//! simply queue (last writer wins).

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::store::{seed_state, StateOrigin, StateStore, StoreError};
use chrono::{DateTime, Utc};

use crate::domain::{RotationSeed, RotationState, StateDocument};

/// Store for rotation state in a JSON file
pub struct JsonStateStore {
    path: PathBuf,
    seed: Option<RotationSeed>,
}

impl JsonStateStore {
    /// Creates a new state store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            seed: None,
        }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(".rota").join("state.json"))
    }

    /// Seeds the store with `seed` when no state file exists yet
    pub fn with_seed(mut self, seed: RotationSeed) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, source: std::io::Error) -> StoreError {
        StoreError::Unavailable {
            path: self.path.clone(),
            source,
        }
    }

    fn corrupt(&self, e: serde_json::Error) -> StoreError {
        StoreError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }

    fn read_text(&self) -> Result<String, StoreError> {
        let mut file = File::open(&self.path).map_err(|e| self.unavailable(e))?;

        // Lock is released when file is dropped
        file.lock_shared().map_err(|e| self.unavailable(e))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| self.unavailable(e))?;
        Ok(content)
    }

    fn read(&self) -> Result<RotationState, StoreError> {
        serde_json::from_str(&self.read_text()?).map_err(|e| self.corrupt(e))
    }
}

impl StateStore for JsonStateStore {
    fn load_with_origin(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(RotationState, StateOrigin), StoreError> {
        if self.path.exists() {
            return Ok((self.read()?, StateOrigin::Persisted));
        }

        let seed = self.seed.as_ref().ok_or(StoreError::NotInitialized)?;
        let state = seed_state(seed, now)?;
        self.save(&state)?;

        tracing::info!(
            path = %self.path.display(),
            members = state.roster.len(),
            frequency = state.config.frequency().as_str(),
            "seeded rotation state"
        );

        Ok((state, StateOrigin::Seeded))
    }

    fn load_document(&self, now: DateTime<Utc>) -> Result<StateDocument, StoreError> {
        if !self.path.exists() {
            return self.load(now).map(|state| StateDocument::from(&state));
        }
        serde_json::from_str(&self.read_text()?).map_err(|e| self.corrupt(e))
    }

    fn save(&self, state: &RotationState) -> Result<(), StoreError> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.unavailable(e))?;
        }

        let lock_path = self.path.with_extension("json.lock");
        let lock = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| self.unavailable(e))?;

        // Held until `lock` drops, after the rename
        lock.lock_exclusive().map_err(|e| self.unavailable(e))?;

        let temp_path = self.path.with_extension("json.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| self.unavailable(e))?;

            let mut writer = BufWriter::new(&file);
            serde_json::to_writer_pretty(&mut writer, state).map_err(|e| StoreError::Corrupt {
                path: temp_path.clone(),
                message: e.to_string(),
            })?;
            writeln!(writer).map_err(|e| self.unavailable(e))?;
            writer.flush().map_err(|e| self.unavailable(e))?;
            file.sync_all().map_err(|e| self.unavailable(e))?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).map_err(|e| self.unavailable(e))?;

        tracing::debug!(
            path = %self.path.display(),
            current_index = state.pointer.current_index(),
            "saved rotation state"
        );

        Ok(())
    }
}
