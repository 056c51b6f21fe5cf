//! Roster of rotation members
//!
//! The roster is ordered: the rotation walks it front to back and wraps.
//! Identities are unique within a roster.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::RotationError;

/// A member taking part in the rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub identity: String,
    #[serde(rename = "joinedDate")]
    pub joined: DateTime<Utc>,
}

impl RosterEntry {
    pub fn new(identity: impl Into<String>, joined: DateTime<Utc>) -> Self {
        Self {
            identity: identity.into(),
            joined,
        }
    }
}

/// Ordered list of members
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster(Vec<RosterEntry>);

impl Roster {
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Self(entries)
    }

    /// Builds a roster from identities, all joining at `joined`
    pub fn from_identities<I, S>(identities: I, joined: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            identities
                .into_iter()
                .map(|identity| RosterEntry::new(identity, joined))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RosterEntry> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RosterEntry> {
        self.0.iter()
    }

    /// Position of the member with `identity`
    pub fn position(&self, identity: &str) -> Option<usize> {
        self.0.iter().position(|e| e.identity == identity)
    }

    pub fn find(&self, identity: &str) -> Option<&RosterEntry> {
        self.0.iter().find(|e| e.identity == identity)
    }

    pub fn identities(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.identity.as_str()).collect()
    }

    /// Identities that appear more than once, in first-seen order
    pub fn duplicates(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut dups = Vec::new();
        for entry in &self.0 {
            let id = entry.identity.as_str();
            if !seen.insert(id) && !dups.contains(&id) {
                dups.push(id);
            }
        }
        dups
    }

    /// Appends a member, rejecting duplicate identities
    pub fn push(&mut self, entry: RosterEntry) -> Result<(), RotationError> {
        if self.position(&entry.identity).is_some() {
            return Err(RotationError::DuplicateMember {
                identity: entry.identity,
            });
        }
        self.0.push(entry);
        Ok(())
    }

    /// Removes a member and returns its former position
    ///
    /// The sole member cannot be removed.
    pub fn remove(&mut self, identity: &str) -> Result<(usize, RosterEntry), RotationError> {
        let index = self
            .position(identity)
            .ok_or_else(|| RotationError::RosterMemberNotFound {
                identity: identity.to_string(),
            })?;

        if self.0.len() == 1 {
            return Err(RotationError::SoleMember {
                identity: identity.to_string(),
            });
        }

        Ok((index, self.0.remove(index)))
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a RosterEntry;
    type IntoIter = std::slice::Iter<'a, RosterEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
