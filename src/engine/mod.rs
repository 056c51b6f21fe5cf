//! # Rotation Engine
//!
//! Read-decide-write cycles over a [`StateStore`]. Every operation loads the
//! state afresh; nothing is cached between calls, so a manual skip made by
//! another process is always seen by the next query.
//!
//! The pointer only ever moves through a whole [`Pointer`] replacement, so
//! the index and the last-rotation instant are saved in the same write.
//! Two concurrent skips are not coordinated beyond that: last writer wins.
//!
//! ## Operations
//!
//! | Operation | Mutates | Notes |
//! |-----------|---------|-------|
//! | [`RotationEngine::current_owner`] | maybe | advances once if a new period began |
//! | [`RotationEngine::current_owner_read_only`] | seed only | |
//! | [`RotationEngine::advance_to_next`] | always | manual skip, resets the period clock |
//! | [`RotationEngine::set_owner`] | always | jump to a named member |
//! | [`RotationEngine::owner_on_date`] | never | counted from the rotation start |
//! | [`RotationEngine::upcoming_schedule`] | never | |
//! | [`RotationEngine::validate`] | seed only | reads the raw document |
//!
//! "Seed only": the first load of a store with no persisted state writes the
//! configured seed, through any operation. After that these never write.

mod clock;

pub use clock::{Clock, FixedClock, SystemClock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    self, advance_by, is_new_period, period_for, periods_between, PeriodInfo, RosterEntry,
    RotationError, RotationState, ValidationReport,
};
use crate::storage::{StateOrigin, StateStore};

/// One row of a schedule preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    /// 1-based position in the preview (not the calendar period number)
    #[serde(rename = "periodNumber")]
    pub position: u32,
    pub owner: RosterEntry,
    #[serde(rename = "periodInfo")]
    pub period: PeriodInfo,
}

/// Payload handed to whatever posts the announcement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub owner: RosterEntry,
    #[serde(rename = "periodInfo")]
    pub period: PeriodInfo,
}

/// Drives the rotation over a state store and a clock
pub struct RotationEngine<S, C> {
    store: S,
    clock: C,
}

impl<S: StateStore, C: Clock> RotationEngine<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current moment as seen by the engine
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn load(&self) -> Result<RotationState, RotationError> {
        let (state, origin) = self.store.load_with_origin(self.clock.now())?;
        if origin == StateOrigin::Seeded {
            tracing::info!(members = state.roster.len(), "rotation started from seed");
        }
        Ok(state)
    }

    /// Snapshot of the persisted state
    pub fn state(&self) -> Result<RotationState, RotationError> {
        self.load()
    }

    /// Owner for the current period, advancing first if a new period began
    ///
    /// Advances at most once per call, however many periods have elapsed.
    pub fn current_owner(&self) -> Result<RosterEntry, RotationError> {
        let state = self.load()?;
        let now = self.clock.now();
        let last = state.pointer.last_rotation();

        if is_new_period(last, now, &state.config) {
            tracing::debug!(
                last_rotation = %last,
                now = %now,
                frequency = state.config.frequency().as_str(),
                "new period began"
            );
            self.advance_to_next()?;
            return self.load()?.current().cloned();
        }

        state.current().cloned()
    }

    /// Owner the pointer names, without checking period boundaries
    ///
    /// Never moves the pointer. On a store with nothing persisted yet the
    /// seed is still written, like any first load.
    pub fn current_owner_read_only(&self) -> Result<RosterEntry, RotationError> {
        self.load()?.current().cloned()
    }

    /// Moves the pointer to the next member unconditionally
    pub fn advance_to_next(&self) -> Result<RosterEntry, RotationError> {
        let mut state = self.load()?;
        if state.roster.is_empty() {
            return Err(RotationError::EmptyRoster);
        }

        let previous = state.pointer.current_index();
        let next = (previous + 1) % state.roster.len();
        state.pointer = state.pointer.moved_to(next, self.clock.now());
        self.store.save(&state)?;

        let owner = state.entry(next)?.clone();
        tracing::info!(from = previous, to = next, owner = %owner.identity, "advanced rotation");
        Ok(owner)
    }

    /// Owner of the period containing `target`, counted from the rotation start
    pub fn owner_on_date(&self, target: DateTime<Utc>) -> Result<RosterEntry, RotationError> {
        let state = self.load()?;
        owner_at(&state, target).cloned()
    }

    /// Owners of the next `periods_ahead` periods, starting with the current one
    pub fn upcoming_schedule(&self, periods_ahead: u32) -> Result<Vec<ScheduleEntry>, RotationError> {
        let state = self.load()?;
        let now = self.clock.now();

        (0..periods_ahead)
            .map(|i| {
                let target = advance_by(now, i, &state.config);
                Ok(ScheduleEntry {
                    position: i + 1,
                    owner: owner_at(&state, target)?.clone(),
                    period: period_for(target, &state.config),
                })
            })
            .collect()
    }

    /// Points the rotation at the member with `identity`
    pub fn set_owner(&self, identity: &str) -> Result<RosterEntry, RotationError> {
        let mut state = self.load()?;
        let index = state
            .roster
            .position(identity)
            .ok_or_else(|| RotationError::RosterMemberNotFound {
                identity: identity.to_string(),
            })?;

        state.pointer = state.pointer.moved_to(index, self.clock.now());
        self.store.save(&state)?;

        tracing::info!(owner = identity, index, "set rotation owner");
        state.entry(index).cloned()
    }

    /// Consistency check of the persisted state
    ///
    /// Works on the raw document, so unparseable timestamps and bad config
    /// fields are reported together instead of failing the load.
    pub fn validate(&self) -> Result<ValidationReport, RotationError> {
        let now = self.clock.now();
        let document = self.store.load_document(now)?;
        Ok(domain::validate(&document, now))
    }

    /// Current owner and period, ready for a notification sink
    pub fn notification(&self) -> Result<Notification, RotationError> {
        let owner = self.current_owner()?;
        let state = self.load()?;
        Ok(Notification {
            owner,
            period: period_for(self.clock.now(), &state.config),
        })
    }

    /// Appends a member to the end of the roster
    pub fn add_member(&self, identity: &str) -> Result<RosterEntry, RotationError> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(RotationError::InvalidConfig {
                field: "identity",
                value: "\"\"".to_string(),
                reason: "must not be blank",
            });
        }

        let mut state = self.load()?;
        let entry = RosterEntry::new(identity, self.clock.now());
        state.roster.push(entry.clone())?;
        self.store.save(&state)?;

        tracing::info!(identity, members = state.roster.len(), "added roster member");
        Ok(entry)
    }

    /// Removes a member, keeping the pointer on a sensible owner
    ///
    /// Removing someone before the pointer shifts it down so the same person
    /// stays on duty. Removing the current owner hands over to whoever
    /// followed them. The period anchor is left untouched.
    pub fn remove_member(&self, identity: &str) -> Result<RosterEntry, RotationError> {
        let mut state = self.load()?;
        let (removed_at, entry) = state.roster.remove(identity)?;

        let current = state.pointer.current_index();
        let len = state.roster.len();
        let index = if removed_at < current {
            current - 1
        } else if removed_at == current {
            current % len
        } else {
            current
        };
        state.pointer = state.pointer.reindexed(index);
        self.store.save(&state)?;

        tracing::info!(identity, members = len, current_index = index, "removed roster member");
        Ok(entry)
    }
}

/// Owner of the period containing `target` for `state`
fn owner_at(state: &RotationState, target: DateTime<Utc>) -> Result<&RosterEntry, RotationError> {
    if state.roster.is_empty() {
        return Err(RotationError::EmptyRoster);
    }

    let periods = periods_between(state.rotation_start, target, &state.config);
    let len = state.roster.len() as i64;
    // rem_euclid keeps dates before the start inside [0, len)
    let index = periods.rem_euclid(len) as usize;
    state.entry(index)
}
