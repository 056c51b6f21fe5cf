//! Persisted rotation state
//!
//! One document holds the roster, the rotation pointer, the rotation anchor
//! and the config. The pointer's index and its last-rotation timestamp form
//! a single value: they are always replaced together.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::error::RotationError;
use super::roster::{Roster, RosterEntry};
use super::rotation::{RawRotationConfig, RotationConfig};

/// Current position in the roster and when it was last moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pointer {
    #[serde(rename = "currentIndex")]
    current_index: usize,
    #[serde(rename = "lastRotationInstant")]
    last_rotation: DateTime<Utc>,
}

impl Pointer {
    pub fn new(current_index: usize, last_rotation: DateTime<Utc>) -> Self {
        Self {
            current_index,
            last_rotation,
        }
    }

    /// Same pointer moved to `index` at `at`
    pub fn moved_to(self, index: usize, at: DateTime<Utc>) -> Self {
        Self::new(index, at)
    }

    /// Same position with the last-rotation instant kept
    pub fn reindexed(self, index: usize) -> Self {
        Self::new(index, self.last_rotation)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn last_rotation(&self) -> DateTime<Utc> {
        self.last_rotation
    }
}

/// The full rotation document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationState {
    pub roster: Roster,
    #[serde(flatten)]
    pub pointer: Pointer,
    #[serde(rename = "rotationStartInstant")]
    pub rotation_start: DateTime<Utc>,
    pub config: RotationConfig,
}

impl RotationState {
    /// Creates a state pointing at the first member, anchored at `start`
    pub fn new(
        roster: Roster,
        config: RotationConfig,
        start: DateTime<Utc>,
    ) -> Result<Self, RotationError> {
        if roster.is_empty() {
            return Err(RotationError::EmptyRoster);
        }
        if let Some(dup) = roster.duplicates().first() {
            return Err(RotationError::DuplicateMember {
                identity: dup.to_string(),
            });
        }

        Ok(Self {
            roster,
            pointer: Pointer::new(0, start),
            rotation_start: start,
            config,
        })
    }

    /// Member the pointer names
    pub fn current(&self) -> Result<&RosterEntry, RotationError> {
        self.entry(self.pointer.current_index())
    }

    /// Member at `index`, with the same errors as [`RotationState::current`]
    pub fn entry(&self, index: usize) -> Result<&RosterEntry, RotationError> {
        if self.roster.is_empty() {
            return Err(RotationError::EmptyRoster);
        }
        self.roster
            .get(index)
            .ok_or(RotationError::PointerOutOfRange {
                index,
                len: self.roster.len(),
            })
    }
}

/// First-load default for a store with no persisted state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationSeed {
    pub members: Vec<String>,
    pub config: RotationConfig,
    /// Rotation anchor; the load time is used when absent
    pub start: Option<DateTime<Utc>>,
}

impl RotationSeed {
    pub fn new(members: Vec<String>, config: RotationConfig) -> Self {
        Self {
            members,
            config,
            start: None,
        }
    }

    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    /// Builds the initial state
    pub fn into_state(self, now: DateTime<Utc>) -> Result<RotationState, RotationError> {
        let start = self.start.unwrap_or(now);
        let roster = Roster::from_identities(self.members, start);
        RotationState::new(roster, self.config, start)
    }
}

/// Outcome of a consistency check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Unvalidated mirror of the state file
///
/// Timestamps stay as text and every field is optional, so a damaged file can
/// still be read and all of its problems reported together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(default)]
    pub roster: Vec<DocumentEntry>,
    #[serde(rename = "currentIndex", default)]
    pub current_index: Option<i64>,
    #[serde(rename = "lastRotationInstant", default)]
    pub last_rotation: Option<String>,
    #[serde(rename = "rotationStartInstant", default)]
    pub rotation_start: Option<String>,
    #[serde(default)]
    pub config: Option<RawRotationConfig>,
}

/// Roster entry as found in a [`StateDocument`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEntry {
    #[serde(default)]
    pub identity: String,
    #[serde(rename = "joinedDate", default)]
    pub joined: Option<String>,
}

fn timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl From<&RotationState> for StateDocument {
    fn from(state: &RotationState) -> Self {
        Self {
            roster: state
                .roster
                .iter()
                .map(|entry| DocumentEntry {
                    identity: entry.identity.clone(),
                    joined: Some(timestamp(entry.joined)),
                })
                .collect(),
            current_index: i64::try_from(state.pointer.current_index()).ok(),
            last_rotation: Some(timestamp(state.pointer.last_rotation())),
            rotation_start: Some(timestamp(state.rotation_start)),
            config: Some(state.config.into()),
        }
    }
}

impl RotationState {
    /// Consistency check of this state, see [`validate`]
    pub fn validate(&self, now: DateTime<Utc>) -> ValidationReport {
        validate(&StateDocument::from(self), now)
    }
}

fn parse_instant(
    field: &str,
    value: Option<&str>,
    errors: &mut Vec<String>,
) -> Option<DateTime<Utc>> {
    let Some(raw) = value else {
        errors.push(format!("{} is missing", field));
        return None;
    };

    match raw.parse::<DateTime<Utc>>() {
        Ok(instant) => Some(instant),
        Err(e) => {
            errors.push(format!("{} is not a valid timestamp ('{}': {})", field, raw, e));
            None
        }
    }
}

fn check_not_future(
    field: &str,
    instant: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    errors: &mut Vec<String>,
) {
    if let Some(instant) = instant.filter(|t| *t > now) {
        errors.push(format!("{} is in the future ({})", field, instant.to_rfc3339()));
    }
}

/// Checks a state document, collecting every problem found
pub fn validate(document: &StateDocument, now: DateTime<Utc>) -> ValidationReport {
    let mut errors = Vec::new();
    let len = document.roster.len();

    if len == 0 {
        errors.push(RotationError::EmptyRoster.to_string());
    }

    match document.current_index {
        None => errors.push("currentIndex is missing".to_string()),
        Some(index) if index < 0 => errors.push(format!("currentIndex {} is negative", index)),
        Some(index) => match usize::try_from(index) {
            Ok(index) if len > 0 && index >= len => {
                errors.push(RotationError::PointerOutOfRange { index, len }.to_string())
            }
            _ => {}
        },
    }

    let mut seen: Vec<&str> = Vec::new();
    let mut reported: Vec<&str> = Vec::new();
    for (i, entry) in document.roster.iter().enumerate() {
        let identity = entry.identity.as_str();
        if identity.trim().is_empty() {
            errors.push(format!("Roster entry {} has a blank identity", i));
        } else if seen.contains(&identity) {
            if !reported.contains(&identity) {
                reported.push(identity);
                errors.push(
                    RotationError::DuplicateMember {
                        identity: identity.to_string(),
                    }
                    .to_string(),
                );
            }
        } else {
            seen.push(identity);
        }

        let field = format!("Roster entry '{}' joinedDate", identity);
        let joined = parse_instant(&field, entry.joined.as_deref(), &mut errors);
        check_not_future(&field, joined, now, &mut errors);
    }

    let last = parse_instant(
        "lastRotationInstant",
        document.last_rotation.as_deref(),
        &mut errors,
    );
    let start = parse_instant(
        "rotationStartInstant",
        document.rotation_start.as_deref(),
        &mut errors,
    );
    check_not_future("lastRotationInstant", last, now, &mut errors);
    check_not_future("rotationStartInstant", start, now, &mut errors);
    if let (Some(last), Some(start)) = (last, start) {
        if last < start {
            errors.push(format!(
                "lastRotationInstant ({}) precedes rotationStartInstant ({})",
                last.to_rfc3339(),
                start.to_rfc3339()
            ));
        }
    }

    match &document.config {
        Some(config) => errors.extend(config.violations().iter().map(ToString::to_string)),
        None => errors.push("config is missing".to_string()),
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}
