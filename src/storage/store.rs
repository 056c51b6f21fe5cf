//! State store contract
//!
//! The engine reads and writes rotation state only through [`StateStore`].
//! A single `save` call is the unit of atomicity; nothing stronger is assumed.
//! Loads take the caller's `now` so a first-load seed is anchored on the same
//! clock as every later timestamp.

use std::cell::{Cell, RefCell};
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{RotationSeed, RotationState, StateDocument};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access state file {}: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("State file {} is corrupt: {message}", .path.display())]
    Corrupt { path: PathBuf, message: String },

    #[error("No rotation state found and no seed configured. Run 'rota init' first.")]
    NotInitialized,

    #[error("Seed rejected: {0}")]
    InvalidSeed(String),
}

/// Where a loaded state came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateOrigin {
    /// Read back from a previous save
    Persisted,
    /// Built from the configured seed because nothing was persisted yet
    Seeded,
}

/// Persistence backend for rotation state
pub trait StateStore {
    /// Loads the state, seeding it at `now` on first use if a seed is configured
    fn load_with_origin(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(RotationState, StateOrigin), StoreError>;

    fn load(&self, now: DateTime<Utc>) -> Result<RotationState, StoreError> {
        self.load_with_origin(now).map(|(state, _)| state)
    }

    /// Loads the persisted document without typed parsing, for validation
    ///
    /// Seeds like [`StateStore::load`] when nothing is persisted yet.
    fn load_document(&self, now: DateTime<Utc>) -> Result<StateDocument, StoreError> {
        self.load(now).map(|state| StateDocument::from(&state))
    }

    /// Replaces the persisted state in one write
    fn save(&self, state: &RotationState) -> Result<(), StoreError>;
}

impl<T: StateStore + ?Sized> StateStore for &T {
    fn load_with_origin(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(RotationState, StateOrigin), StoreError> {
        (**self).load_with_origin(now)
    }

    fn load_document(&self, now: DateTime<Utc>) -> Result<StateDocument, StoreError> {
        (**self).load_document(now)
    }

    fn save(&self, state: &RotationState) -> Result<(), StoreError> {
        (**self).save(state)
    }
}

/// Resolves a seed into a fresh state, anchored at `now` unless it has a start
pub(crate) fn seed_state(
    seed: &RotationSeed,
    now: DateTime<Utc>,
) -> Result<RotationState, StoreError> {
    seed.clone()
        .into_state(now)
        .map_err(|e| StoreError::InvalidSeed(e.to_string()))
}

/// In-process store, used by tests and embedders that persist elsewhere
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RefCell<Option<RotationState>>,
    seed: Option<RotationSeed>,
    saves: Cell<usize>,
}

impl MemoryStore {
    /// Creates a store already holding `state`
    pub fn new(state: RotationState) -> Self {
        Self {
            state: RefCell::new(Some(state)),
            seed: None,
            saves: Cell::new(0),
        }
    }

    /// Creates an empty store that seeds itself on first load
    pub fn with_seed(seed: RotationSeed) -> Self {
        Self {
            state: RefCell::new(None),
            seed: Some(seed),
            saves: Cell::new(0),
        }
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    /// Current contents without going through `load`
    pub fn snapshot(&self) -> Option<RotationState> {
        self.state.borrow().clone()
    }
}

impl StateStore for MemoryStore {
    fn load_with_origin(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(RotationState, StateOrigin), StoreError> {
        if let Some(state) = self.state.borrow().as_ref() {
            return Ok((state.clone(), StateOrigin::Persisted));
        }

        let seed = self.seed.as_ref().ok_or(StoreError::NotInitialized)?;
        let state = seed_state(seed, now)?;
        self.save(&state)?;
        Ok((state, StateOrigin::Seeded))
    }

    fn save(&self, state: &RotationState) -> Result<(), StoreError> {
        *self.state.borrow_mut() = Some(state.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
