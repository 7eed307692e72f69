//! Target-path conflict detection and resolution.
//!
//! Detection groups `Rename` changes by target path: a group of two or more is
//! a `MultipleSource` conflict, a single change whose target is already on
//! disk is a `TargetExists` conflict. A change therefore belongs to at most one
//! conflict. Resolution rewrites targets or actions in place and unlinks the
//! conflict from its changes.

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, DurationRound, Utc};
use reelname_core::util::split_extension;
use reelname_core::{Action, Conflict, ConflictKind, ConflictStrategy, FileRef, Plan, Resolution};

use crate::error::ResolveError;

/// Filesystem occupancy check, swappable in tests.
pub type PathProbe = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

/// Occupied means anything is there, including a dangling symlink.
pub fn disk_probe() -> PathProbe {
    Arc::new(|path: &Path| std::fs::symlink_metadata(path).is_ok())
}

/// Suffix format for `append_timestamp`, microsecond resolution.
const TIMESTAMP_SUFFIX_FORMAT: &str = "%Y%m%d-%H%M%S%.6f";

pub struct ConflictDetector {
    exists: PathProbe,
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ConflictDetector {
    pub fn new() -> Self {
        Self { exists: disk_probe() }
    }

    pub fn with_probe(exists: PathProbe) -> Self {
        Self { exists }
    }

    /// Find conflicts among `Rename` changes, in order of first appearance.
    pub fn detect(&self, changes: &[reelname_core::Change]) -> Vec<Conflict> {
        let mut groups: Vec<(PathBuf, Vec<String>)> = Vec::new();
        let mut index: HashMap<&Path, usize> = HashMap::new();

        for change in changes.iter().filter(|c| c.action == Action::Rename) {
            match index.get(change.after.path.as_path()) {
                Some(&i) => groups[i].1.push(change.id.clone()),
                None => {
                    index.insert(change.after.path.as_path(), groups.len());
                    groups.push((change.after.path.clone(), vec![change.id.clone()]));
                }
            }
        }

        groups
            .into_iter()
            .filter_map(|(target, ids)| {
                if ids.len() >= 2 {
                    Some(Conflict::new(ConflictKind::MultipleSource, target, ids))
                } else if (self.exists)(&target) {
                    Some(Conflict::new(ConflictKind::TargetExists, target, ids))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Detect conflicts for `plan` and link each change to its conflict.
    pub fn detect_into(&self, plan: &mut Plan) {
        let conflicts = self.detect(&plan.changes);
        for conflict in &conflicts {
            for change_id in &conflict.change_ids {
                if let Some(change) = plan.change_mut(change_id) {
                    change.conflict_ids.push(conflict.id.clone());
                }
            }
        }
        if !conflicts.is_empty() {
            log::debug!("Detected {} conflicts in plan {}", conflicts.len(), plan.id);
        }
        plan.conflicts.extend(conflicts);
    }
}

/// Strictly increasing microsecond timestamps.
#[derive(Default)]
struct SuffixClock {
    last: Cell<Option<DateTime<Utc>>>,
}

impl SuffixClock {
    fn next(&self) -> DateTime<Utc> {
        let tick = Duration::microseconds(1);
        let now = Utc::now();
        let now = now.duration_trunc(tick).unwrap_or(now);
        let next = match self.last.get() {
            Some(last) if now <= last => last + tick,
            _ => now,
        };
        self.last.set(Some(next));
        next
    }
}

/// Applies a [`ConflictStrategy`] to a plan's conflicts.
///
/// Single-threaded: it mutates one plan at a time.
pub struct ConflictResolver {
    exists: PathProbe,
    clock: SuffixClock,
}

impl Default for ConflictResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConflictResolver {
    pub fn new() -> Self {
        Self::with_probe(disk_probe())
    }

    pub fn with_probe(exists: PathProbe) -> Self {
        Self {
            exists,
            clock: SuffixClock::default(),
        }
    }

    /// Resolve every unresolved conflict with one strategy, in list order.
    ///
    /// `PromptUser` leaves conflicts open for [`resolve_conflict`](Self::resolve_conflict).
    /// Stops at the first error; the plan is then partially resolved.
    pub fn resolve_all(&self, plan: &mut Plan, strategy: ConflictStrategy) -> Result<(), ResolveError> {
        self.resolve_all_by(plan, |_, _| strategy)
    }

    /// Like [`resolve_all`](Self::resolve_all), choosing the strategy per conflict.
    pub fn resolve_all_by<F>(&self, plan: &mut Plan, mut pick: F) -> Result<(), ResolveError>
    where
        F: FnMut(&Plan, &Conflict) -> ConflictStrategy,
    {
        for idx in 0..plan.conflicts.len() {
            if plan.conflicts[idx].resolved {
                continue;
            }
            let strategy = pick(plan, &plan.conflicts[idx]);
            if !strategy.is_automatic() {
                log::debug!(
                    "Leaving conflict {} for interactive resolution",
                    plan.conflicts[idx].id
                );
                continue;
            }
            self.resolve_at(plan, idx, strategy)?;
        }
        Ok(())
    }

    /// Resolve one conflict by id, e.g. after asking the user.
    pub fn resolve_conflict(
        &self,
        plan: &mut Plan,
        conflict_id: &str,
        strategy: ConflictStrategy,
    ) -> Result<(), ResolveError> {
        let idx = plan
            .conflicts
            .iter()
            .position(|c| c.id == conflict_id)
            .ok_or_else(|| ResolveError::UnknownConflict(conflict_id.to_string()))?;
        if plan.conflicts[idx].resolved {
            return Err(ResolveError::AlreadyResolved(conflict_id.to_string()));
        }
        if !strategy.is_automatic() {
            return Err(ResolveError::UnsupportedStrategy(strategy.name().to_string()));
        }
        self.resolve_at(plan, idx, strategy)
    }

    fn resolve_at(&self, plan: &mut Plan, idx: usize, strategy: ConflictStrategy) -> Result<(), ResolveError> {
        let conflict = plan.conflicts[idx].clone();
        validate(plan, &conflict)?;

        log::debug!(
            "Resolving {} conflict {} on {} with {}",
            conflict.kind,
            conflict.id,
            conflict.target_path.display(),
            strategy
        );

        let modifications = match conflict.kind {
            ConflictKind::MultipleSource => self.resolve_multiple_source(plan, &conflict, strategy)?,
            ConflictKind::TargetExists => {
                resolve_target_exists(plan, &conflict, strategy);
                BTreeMap::new()
            }
        };

        for change_id in &conflict.change_ids {
            if let Some(change) = plan.change_mut(change_id) {
                change.conflict_ids.retain(|id| id != &conflict.id);
            }
        }

        let target = &mut plan.conflicts[idx];
        target.resolved = true;
        target.resolution = Some(Resolution {
            strategy: strategy.name().to_string(),
            modifications,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    fn resolve_multiple_source(
        &self,
        plan: &mut Plan,
        conflict: &Conflict,
        strategy: ConflictStrategy,
    ) -> Result<BTreeMap<String, PathBuf>, ResolveError> {
        let mut modifications = BTreeMap::new();

        match strategy {
            ConflictStrategy::Skip => set_action(plan, &conflict.change_ids, Action::Skip),
            ConflictStrategy::Overwrite => set_action(plan, &conflict.change_ids[1..], Action::Skip),
            ConflictStrategy::AppendNumber => {
                for (i, change_id) in conflict.change_ids.iter().enumerate().skip(1) {
                    let mut counter = i;
                    let target = loop {
                        let candidate = suffixed(plan, conflict, change_id, &counter.to_string())?;
                        if !self.is_taken(plan, &candidate.path, change_id) {
                            break candidate;
                        }
                        counter += 1;
                    };
                    modifications.insert(change_id.clone(), target.path.clone());
                    retarget(plan, change_id, target);
                }
            }
            ConflictStrategy::AppendTimestamp => {
                for change_id in conflict.change_ids.iter().skip(1) {
                    let target = loop {
                        let stamp = self.clock.next().format(TIMESTAMP_SUFFIX_FORMAT).to_string();
                        let candidate = suffixed(plan, conflict, change_id, &stamp)?;
                        if !self.is_taken(plan, &candidate.path, change_id) {
                            break candidate;
                        }
                    };
                    modifications.insert(change_id.clone(), target.path.clone());
                    retarget(plan, change_id, target);
                }
            }
            ConflictStrategy::PromptUser => {
                return Err(ResolveError::UnsupportedStrategy(strategy.name().to_string()));
            }
        }

        Ok(modifications)
    }

    /// A path is taken if another pending rename targets it or it exists on disk.
    fn is_taken(&self, plan: &Plan, path: &Path, exclude_id: &str) -> bool {
        plan.changes
            .iter()
            .any(|c| c.id != exclude_id && c.action == Action::Rename && c.after.path == path)
            || (self.exists)(path)
    }
}

fn validate(plan: &Plan, conflict: &Conflict) -> Result<(), ResolveError> {
    match conflict.kind {
        ConflictKind::MultipleSource if conflict.change_ids.len() < 2 => {
            return Err(ResolveError::malformed(
                &conflict.id,
                format!("multiple_source needs at least 2 changes, has {}", conflict.change_ids.len()),
            ));
        }
        ConflictKind::TargetExists if conflict.change_ids.len() != 1 => {
            return Err(ResolveError::malformed(
                &conflict.id,
                format!("target_exists needs exactly 1 change, has {}", conflict.change_ids.len()),
            ));
        }
        _ => {}
    }

    match conflict.change_ids.iter().find(|id| plan.change(id).is_none()) {
        Some(missing) => Err(ResolveError::UnknownChange {
            conflict: conflict.id.clone(),
            change: missing.clone(),
        }),
        None => Ok(()),
    }
}

/// `AppendNumber` and `AppendTimestamp` have no meaning for a single change,
/// so everything except `Overwrite` skips it.
fn resolve_target_exists(plan: &mut Plan, conflict: &Conflict, strategy: ConflictStrategy) {
    match strategy {
        ConflictStrategy::Overwrite => {}
        _ => set_action(plan, &conflict.change_ids, Action::Skip),
    }
}

fn set_action(plan: &mut Plan, change_ids: &[String], action: Action) {
    for id in change_ids {
        if let Some(change) = plan.change_mut(id) {
            change.action = action;
        }
    }
}

/// `"<stem> (<suffix>)<ext>"` next to the change's current target.
fn suffixed(plan: &Plan, conflict: &Conflict, change_id: &str, suffix: &str) -> Result<FileRef, ResolveError> {
    let change = plan.change(change_id).ok_or_else(|| ResolveError::UnknownChange {
        conflict: conflict.id.clone(),
        change: change_id.to_string(),
    })?;
    let (stem, ext) = split_extension(&change.after.filename);
    Ok(FileRef::in_dir(
        change.after.dir(),
        format!("{stem} ({suffix}){ext}"),
    ))
}

fn retarget(plan: &mut Plan, change_id: &str, target: FileRef) {
    if let Some(change) = plan.change_mut(change_id) {
        change.after = target;
    }
}

#[cfg(test)]
#[path = "tests/conflict_tests.rs"]
mod tests;
