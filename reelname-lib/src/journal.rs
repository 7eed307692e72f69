//! File-backed journal of applied renames.
//!
//! Every operation loads the whole document and every mutation rewrites it
//! through a temp file and rename. The store assumes a single writer: two
//! processes doing load/mutate/save at once can lose entries, so callers that
//! run concurrently must serialize access themselves.

use std::path::{Path, PathBuf};

use reelname_core::journal::is_supported_version;
use reelname_core::{JOURNAL_VERSION, Renamer, State, StateEntry};
use serde::Deserialize;

use crate::error::{JournalError, RevertError};

const APP_DIR: &str = "reelname";
const JOURNAL_FILE: &str = "journal.json";

#[derive(Deserialize)]
struct VersionHeader {
    version: String,
}

/// Default journal location: `<config dir>/reelname/journal.json`.
pub fn default_journal_path() -> Result<PathBuf, JournalError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(JOURNAL_FILE))
        .ok_or(JournalError::NoConfigDir)
}

/// Result of a revert whose file move succeeded.
#[derive(Debug)]
pub enum RevertOutcome {
    /// File restored and entry marked reverted.
    Reverted,
    /// File restored, but the entry could not be marked. It still reads as active.
    JournalStale(JournalError),
}

/// Per-entry breakdown of a batch revert.
#[derive(Debug, Default)]
pub struct RevertReport {
    pub reverted: Vec<StateEntry>,
    pub stale: Vec<(StateEntry, JournalError)>,
    pub failed: Vec<(StateEntry, RevertError)>,
}

impl RevertReport {
    /// Entries whose file was moved back, journal updated or not.
    pub fn restored_count(&self) -> usize {
        self.reverted.len() + self.stale.len()
    }

    pub fn total(&self) -> usize {
        self.restored_count() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.stale.is_empty()
    }
}

pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open_default() -> Result<Self, JournalError> {
        Ok(Self::new(default_journal_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the journal. A missing (or empty) file is an empty journal.
    pub fn load(&self) -> Result<State, JournalError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(State::default()),
            Err(e) => return Err(JournalError::io(&self.path, e)),
        };
        if contents.trim().is_empty() {
            return Ok(State::default());
        }

        // Check the version before the entries, whose shape may differ in newer formats.
        let header: VersionHeader = serde_json::from_str(&contents).map_err(|source| JournalError::Parse {
            path: self.path.clone(),
            source,
        })?;
        if !is_supported_version(&header.version) {
            return Err(JournalError::UnsupportedVersion {
                found: header.version,
                supported: JOURNAL_VERSION.to_string(),
            });
        }

        serde_json::from_str(&contents).map_err(|source| JournalError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Rewrite the journal atomically.
    pub fn save(&self, state: &State) -> Result<(), JournalError> {
        let serialized = serde_json::to_string_pretty(state)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| JournalError::io(parent, e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serialized).map_err(|e| JournalError::io(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| JournalError::io(&self.path, e))?;
        Ok(())
    }

    pub fn append(&self, entry: StateEntry) -> Result<(), JournalError> {
        let mut state = self.load()?;
        state.entries.push(entry);
        self.save(&state)
    }

    pub fn get_by_id(&self, id: &str) -> Result<StateEntry, JournalError> {
        self.load()?
            .get(id)
            .cloned()
            .ok_or_else(|| JournalError::EntryNotFound(id.to_string()))
    }

    /// Expand an id prefix (as shown by `state ls`) to a full entry id.
    pub fn resolve_id(&self, prefix: &str) -> Result<String, JournalError> {
        let state = self.load()?;
        if state.get(prefix).is_some() {
            return Ok(prefix.to_string());
        }
        let mut matches = state.entries.iter().filter(|e| e.id.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(entry), None) if !prefix.is_empty() => Ok(entry.id.clone()),
            (Some(_), Some(_)) => Err(JournalError::AmbiguousId(prefix.to_string())),
            _ => Err(JournalError::EntryNotFound(prefix.to_string())),
        }
    }

    /// The most recently applied entry that is still active.
    pub fn get_last_active(&self) -> Result<Option<StateEntry>, JournalError> {
        Ok(self.load()?.last_active().cloned())
    }

    pub fn get_all_active(&self) -> Result<Vec<StateEntry>, JournalError> {
        Ok(self.load()?.active().cloned().collect())
    }

    /// Entries newest first, optionally only active ones, optionally capped.
    pub fn history(&self, active_only: bool, limit: Option<usize>) -> Result<Vec<StateEntry>, JournalError> {
        let mut entries: Vec<StateEntry> = self
            .load()?
            .entries
            .into_iter()
            .rev()
            .filter(|e| !active_only || e.is_active())
            .collect();
        // Stable sort keeps later-appended entries first among equal timestamps.
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    pub fn mark_reverted(&self, id: &str) -> Result<(), JournalError> {
        let mut state = self.load()?;
        let entry = state
            .get_mut(id)
            .ok_or_else(|| JournalError::EntryNotFound(id.to_string()))?;
        entry.reverted = true;
        self.save(&state)
    }

    /// Move one entry's file back to where it came from.
    ///
    /// Preconditions are checked before anything is touched: the entry is
    /// active, its renamed file exists, and nothing occupies the original path.
    pub fn revert<R: Renamer>(&self, id: &str, renamer: &R) -> Result<RevertOutcome, RevertError> {
        let state = self.load()?;
        let entry = state
            .get(id)
            .ok_or_else(|| RevertError::NotFound(id.to_string()))?;

        if entry.reverted {
            return Err(RevertError::AlreadyReverted(id.to_string()));
        }
        if !entry.new_path.exists() {
            return Err(RevertError::SourceMissing(entry.new_path.clone()));
        }
        if std::fs::symlink_metadata(&entry.original_path).is_ok() {
            return Err(RevertError::DestinationOccupied(entry.original_path.clone()));
        }

        renamer
            .rename(&entry.new_path, &entry.original_path)
            .map_err(|source| RevertError::Rename {
                from: entry.new_path.clone(),
                to: entry.original_path.clone(),
                source,
            })?;
        log::debug!(
            "Reverted {} -> {}",
            entry.new_path.display(),
            entry.original_path.display()
        );

        match self.mark_reverted(id) {
            Ok(()) => Ok(RevertOutcome::Reverted),
            Err(e) => {
                log::warn!(
                    "Restored {} but could not update the journal: {}",
                    entry.original_path.display(),
                    e
                );
                Ok(RevertOutcome::JournalStale(e))
            }
        }
    }

    /// Revert the most recent active entry.
    pub fn revert_last<R: Renamer>(&self, renamer: &R) -> Result<(StateEntry, RevertOutcome), RevertError> {
        let entry = self.get_last_active()?.ok_or(RevertError::NoActiveEntries)?;
        let outcome = self.revert(&entry.id, renamer)?;
        Ok((entry, outcome))
    }

    /// Revert every active entry, newest first, continuing past failures.
    ///
    /// Only a journal that cannot be read up front is an error.
    pub fn revert_all<R: Renamer>(&self, renamer: &R) -> Result<RevertReport, JournalError> {
        let mut active = self.get_all_active()?;
        active.reverse();
        active.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let mut report = RevertReport::default();
        for entry in active {
            match self.revert(&entry.id, renamer) {
                Ok(RevertOutcome::Reverted) => report.reverted.push(entry),
                Ok(RevertOutcome::JournalStale(e)) => report.stale.push((entry, e)),
                Err(e) => {
                    log::debug!("Could not revert {}: {}", entry.id, e);
                    report.failed.push((entry, e));
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
#[path = "tests/journal_tests.rs"]
mod tests;
