//! rota - local-first duty rotation for small teams
//!
//! rota tracks who is "on duty" among a fixed roster and hands over on a
//! daily, weekly, biweekly, monthly or custom cadence. The period calculus
//! lives in [`domain`]; [`engine`] decides when to advance; [`storage`]
//! persists the rotation state and config.

pub mod cli;
pub mod domain;
pub mod engine;
pub mod logging;
pub mod storage;

pub use domain::{PeriodInfo, RosterEntry, RotationConfig, RotationError, RotationState};
pub use engine::RotationEngine;
