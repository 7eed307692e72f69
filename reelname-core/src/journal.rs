//! Persisted record of applied renames.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;
use crate::plan::Change;

/// Current journal document format.
///
/// The schema only grows by optional fields; readers reject a newer major version.
pub const JOURNAL_VERSION: &str = "1.0";

/// Lifecycle of a journal entry. `Reverted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Active,
    Reverted,
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Active => write!(f, "active"),
            EntryStatus::Reverted => write!(f, "reverted"),
        }
    }
}

/// One applied rename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub original_path: PathBuf,
    pub new_path: PathBuf,
    pub original_name: String,
    pub new_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub reverted: bool,
}

impl StateEntry {
    /// Record for a change whose rename just succeeded.
    pub fn from_change(change: &Change) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            original_path: change.before.path.clone(),
            new_path: change.after.path.clone(),
            original_name: change.before.filename.clone(),
            new_name: change.after.filename.clone(),
            metadata: change.metadata.clone(),
            reverted: false,
        }
    }

    pub fn status(&self) -> EntryStatus {
        if self.reverted {
            EntryStatus::Reverted
        } else {
            EntryStatus::Active
        }
    }

    pub fn is_active(&self) -> bool {
        !self.reverted
    }
}

/// Versioned container of journal entries, in append order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub version: String,
    #[serde(default)]
    pub entries: Vec<StateEntry>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            version: JOURNAL_VERSION.to_string(),
            entries: Vec::new(),
        }
    }
}

impl State {
    pub fn get(&self, id: &str) -> Option<&StateEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut StateEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// The active entry with the greatest timestamp. Later entries win ties.
    pub fn last_active(&self) -> Option<&StateEntry> {
        self.entries
            .iter()
            .filter(|e| e.is_active())
            .fold(None, |best: Option<&StateEntry>, e| match best {
                Some(b) if b.timestamp > e.timestamp => Some(b),
                _ => Some(e),
            })
    }

    pub fn active(&self) -> impl Iterator<Item = &StateEntry> {
        self.entries.iter().filter(|e| e.is_active())
    }

    /// Whether this build can read the document's version.
    pub fn is_supported_version(&self) -> bool {
        is_supported_version(&self.version)
    }
}

/// Whether a journal written as `version` can be read by this build.
///
/// Only the major component is compared.
pub fn is_supported_version(version: &str) -> bool {
    fn major(v: &str) -> Option<u32> {
        v.split('.').next()?.trim().parse().ok()
    }
    match (major(version), major(JOURNAL_VERSION)) {
        (Some(found), Some(ours)) => found <= ours,
        _ => false,
    }
}

#[cfg(test)]
#[path = "tests/journal_tests.rs"]
mod tests;
