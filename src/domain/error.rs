//! Rotation error taxonomy

use thiserror::Error;

use crate::storage::StoreError;

/// Errors raised by the rotation model and engine
///
/// Every variant carries the offending field or value so a caller can
/// report it without re-deriving context.
#[derive(Debug, Error)]
pub enum RotationError {
    #[error("Unsupported frequency '{value}' (expected daily, weekly, biweekly, monthly or custom)")]
    UnsupportedFrequency { value: String },

    #[error("Invalid config field '{field}' = {value}: {reason}")]
    InvalidConfig {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Roster is empty")]
    EmptyRoster,

    #[error("Roster member not found: {identity}")]
    RosterMemberNotFound { identity: String },

    #[error("Roster member already exists: {identity}")]
    DuplicateMember { identity: String },

    #[error("Cannot remove {identity}: the roster would be empty")]
    SoleMember { identity: String },

    #[error("Rotation pointer {index} is out of range for a roster of {len}")]
    PointerOutOfRange { index: usize, len: usize },

    #[error("State store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}
