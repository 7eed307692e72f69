//! Executes a plan's renames and records each one in the journal.

use std::path::{Path, PathBuf};

use reelname_core::{Change, Plan, Renamer, StateEntry};

use crate::error::JournalError;
use crate::journal::StateStore;

/// Renames on the local filesystem, creating missing parent directories.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRenamer;

impl Renamer for FsRenamer {
    fn rename(&self, from: &Path, to: &Path) -> std::io::Result<()> {
        if let Some(parent) = to.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::rename(from, to)
    }
}

/// A change whose rename failed. The file was left where it was.
#[derive(Debug)]
pub struct ApplyFailure {
    pub change_id: String,
    pub from: PathBuf,
    pub to: PathBuf,
    pub error: std::io::Error,
}

/// A rename that succeeded but could not be journaled, so it cannot be reverted.
#[derive(Debug)]
pub struct JournalWarning {
    pub change_id: String,
    pub path: PathBuf,
    pub error: JournalError,
}

#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Journal records for every successful rename, journaled or not.
    pub applied: Vec<StateEntry>,
    pub failures: Vec<ApplyFailure>,
    pub journal_warnings: Vec<JournalWarning>,
}

impl ApplyReport {
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Applies eligible changes in plan order. Never retries and never stops early.
#[derive(Debug, Default)]
pub struct ApplyExecutor;

impl ApplyExecutor {
    pub fn new() -> Self {
        Self
    }

    pub fn apply<R: Renamer>(&self, plan: &Plan, renamer: &R, journal: &StateStore) -> ApplyReport {
        self.apply_with(plan, renamer, journal, |_, _| {})
    }

    /// Like [`apply`](Self::apply), calling `on_change` after each attempted rename.
    pub fn apply_with<R, F>(&self, plan: &Plan, renamer: &R, journal: &StateStore, mut on_change: F) -> ApplyReport
    where
        R: Renamer,
        F: FnMut(&Change, Result<(), &std::io::Error>),
    {
        let mut report = ApplyReport::default();

        for change in plan.applicable_changes() {
            if let Err(error) = renamer.rename(&change.before.path, &change.after.path) {
                log::debug!(
                    "Rename failed {} -> {}: {}",
                    change.before.path.display(),
                    change.after.path.display(),
                    error
                );
                on_change(change, Err(&error));
                report.failures.push(ApplyFailure {
                    change_id: change.id.clone(),
                    from: change.before.path.clone(),
                    to: change.after.path.clone(),
                    error,
                });
                continue;
            }
            on_change(change, Ok(()));

            let entry = StateEntry::from_change(change);
            if let Err(error) = journal.append(entry.clone()) {
                log::warn!(
                    "Renamed {} but could not record it in the journal: {}",
                    change.after.path.display(),
                    error
                );
                report.journal_warnings.push(JournalWarning {
                    change_id: change.id.clone(),
                    path: change.after.path.clone(),
                    error,
                });
            }
            report.applied.push(entry);
        }

        report
    }
}

#[cfg(test)]
#[path = "tests/apply_tests.rs"]
mod tests;
