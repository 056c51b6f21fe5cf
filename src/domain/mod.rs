//! Domain models for rota
//!
//! Contains the roster model and the period calculus without any I/O concerns.

mod error;
mod period;
mod roster;
mod rotation;
mod state;

pub use error::RotationError;
pub use period::{advance_by, is_new_period, period_for, periods_between, PeriodInfo, PeriodKind, EPOCH};
pub use roster::{Roster, RosterEntry};
pub use rotation::{
    weekday_from_number, Frequency, FrequencyName, RawRotationConfig, RotationConfig,
    MAX_INTERVAL_DAYS,
};
pub use state::{
    validate, DocumentEntry, Pointer, RotationSeed, RotationState, StateDocument, ValidationReport,
};
