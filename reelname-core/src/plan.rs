//! Rename plan data model: changes, conflicts and the plan aggregate.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;
use crate::strategy::ConflictStrategy;

/// What a change will do when the plan is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// The file is already named correctly.
    Noop,
    /// The file will be renamed.
    Rename,
    /// The file will be left alone because of a conflict.
    Skip,
}

impl Action {
    /// Single-character marker used in plan listings.
    pub fn symbol(&self) -> char {
        match self {
            Action::Noop => ' ',
            Action::Rename => '~',
            Action::Skip => '-',
        }
    }
}

/// A file location: full path plus its filename component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRef {
    pub path: PathBuf,
    pub filename: String,
}

impl FileRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = crate::util::file_name_string(&path);
        Self { path, filename }
    }

    /// A sibling of this file's directory with a different filename.
    pub fn in_dir(dir: &Path, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        Self {
            path: dir.join(&filename),
            filename,
        }
    }

    /// Directory containing the file.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }
}

/// One planned transformation of a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub id: String,
    pub action: Action,
    pub before: FileRef,
    pub after: FileRef,
    /// Unresolved conflicts this change takes part in. Must be empty to apply.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflict_ids: Vec<String>,
    /// Metadata snapshot carried through to the journal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Conflict policy of the source file.
    #[serde(default)]
    pub strategy: ConflictStrategy,
}

impl Change {
    /// Create a change, classifying it as `Rename` or `Noop` by filename.
    pub fn new(before: FileRef, after: FileRef) -> Self {
        let action = if before.filename == after.filename {
            Action::Noop
        } else {
            Action::Rename
        };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            action,
            before,
            after,
            conflict_ids: Vec::new(),
            metadata: None,
            strategy: ConflictStrategy::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: Option<Metadata>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_strategy(mut self, strategy: ConflictStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// True if this change has unresolved conflicts.
    pub fn is_conflicting(&self) -> bool {
        !self.conflict_ids.is_empty()
    }

    /// True if applying the plan would rename this file.
    pub fn is_applicable(&self) -> bool {
        self.action == Action::Rename && !self.is_conflicting()
    }
}

/// Kind of target-path collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Two or more changes want the same target path.
    MultipleSource,
    /// A single change targets a path that already exists on disk.
    TargetExists,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictKind::MultipleSource => write!(f, "multiple_source"),
            ConflictKind::TargetExists => write!(f, "target_exists"),
        }
    }
}

/// How a conflict was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Name of the strategy that was requested.
    pub strategy: String,
    /// Change id → new target path, for changes whose target moved.
    #[serde(default)]
    pub modifications: BTreeMap<String, PathBuf>,
    pub timestamp: DateTime<Utc>,
}

/// A detected target-path collision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub id: String,
    pub target_path: PathBuf,
    pub change_ids: Vec<String>,
    pub kind: ConflictKind,
    pub resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

impl Conflict {
    pub fn new(kind: ConflictKind, target_path: PathBuf, change_ids: Vec<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            target_path,
            change_ids,
            kind,
            resolved: false,
            resolution: None,
        }
    }
}

/// A file that could not be planned (metadata lookup or formatting failed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    pub file: PathBuf,
    pub message: String,
}

impl FileError {
    pub fn new(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            message: message.into(),
        }
    }
}

/// A complete rename plan for one batch of files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub changes: Vec<Change>,
    #[serde(default)]
    pub errors: Vec<FileError>,
    #[serde(default)]
    pub conflicts: Vec<Conflict>,
}

impl Default for Plan {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts describing a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub total_changes: usize,
    pub ready_changes: usize,
    pub conflicted_changes: usize,
    pub skipped_changes: usize,
    pub noop_changes: usize,
    pub error_files: usize,
    pub total_conflicts: usize,
    pub resolved_conflicts: usize,
}

impl Plan {
    /// Create an empty plan with a fresh id.
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            changes: Vec::new(),
            errors: Vec::new(),
            conflicts: Vec::new(),
        }
    }

    pub fn change(&self, id: &str) -> Option<&Change> {
        self.changes.iter().find(|c| c.id == id)
    }

    pub fn change_mut(&mut self, id: &str) -> Option<&mut Change> {
        self.changes.iter_mut().find(|c| c.id == id)
    }

    pub fn conflict(&self, id: &str) -> Option<&Conflict> {
        self.conflicts.iter().find(|c| c.id == id)
    }

    /// Conflicts that still need a decision.
    pub fn unresolved_conflicts(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter().filter(|c| !c.resolved)
    }

    pub fn has_unresolved_conflicts(&self) -> bool {
        self.unresolved_conflicts().next().is_some()
    }

    /// Changes that would be renamed if the plan were applied now.
    pub fn applicable_changes(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter().filter(|c| c.is_applicable())
    }

    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary {
            total_changes: self.changes.len(),
            error_files: self.errors.len(),
            total_conflicts: self.conflicts.len(),
            ..Default::default()
        };

        for change in &self.changes {
            match change.action {
                Action::Rename if change.is_conflicting() => summary.conflicted_changes += 1,
                Action::Rename => summary.ready_changes += 1,
                Action::Skip => summary.skipped_changes += 1,
                Action::Noop => summary.noop_changes += 1,
            }
        }

        summary.resolved_conflicts = self.conflicts.iter().filter(|c| c.resolved).count();
        summary
    }

    /// Check the change ↔ conflict cross-references.
    ///
    /// Every id in a change's `conflict_ids` must name an unresolved conflict
    /// that lists the change, and every unresolved conflict must be listed by
    /// each of its changes. Returns a description of each broken link.
    pub fn broken_links(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let change_ids: HashSet<&str> = self.changes.iter().map(|c| c.id.as_str()).collect();

        for change in &self.changes {
            for conflict_id in &change.conflict_ids {
                match self.conflict(conflict_id) {
                    None => problems.push(format!(
                        "change {} references missing conflict {}",
                        change.id, conflict_id
                    )),
                    Some(conflict) if conflict.resolved => problems.push(format!(
                        "change {} still references resolved conflict {}",
                        change.id, conflict_id
                    )),
                    Some(conflict) if !conflict.change_ids.contains(&change.id) => {
                        problems.push(format!(
                            "conflict {} does not list change {}",
                            conflict_id, change.id
                        ))
                    }
                    Some(_) => {}
                }
            }
        }

        for conflict in self.unresolved_conflicts() {
            for change_id in &conflict.change_ids {
                if !change_ids.contains(change_id.as_str()) {
                    problems.push(format!(
                        "conflict {} references missing change {}",
                        conflict.id, change_id
                    ));
                } else if let Some(change) = self.change(change_id)
                    && !change.conflict_ids.contains(&conflict.id)
                {
                    problems.push(format!(
                        "change {} does not list conflict {}",
                        change_id, conflict.id
                    ));
                }
            }
        }

        problems
    }
}

#[cfg(test)]
#[path = "tests/plan_tests.rs"]
mod tests;
