//! Builds a [`Plan`] from enriched files.

use reelname_core::{Change, Conflict, ConflictStrategy, FileError, FileRef, MediaFile, NameFormatter, Plan};

use crate::conflict::{ConflictDetector, ConflictResolver};
use crate::error::ResolveError;
use crate::pipeline::EnrichReport;

/// Planning knobs derived from settings and command-line flags.
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Resolve every conflict with this strategy instead of each file's own tag.
    pub strategy_override: Option<ConflictStrategy>,
}

/// Turns files into changes, then detects and resolves conflicts.
///
/// Output order follows input order, so the same files in the same order
/// against the same disk state always yield the same targets.
pub struct PlanBuilder<F> {
    formatter: F,
    options: PlanOptions,
    detector: ConflictDetector,
    resolver: ConflictResolver,
}

impl<F: NameFormatter> PlanBuilder<F> {
    pub fn new(formatter: F) -> Self {
        Self {
            formatter,
            options: PlanOptions::default(),
            detector: ConflictDetector::new(),
            resolver: ConflictResolver::new(),
        }
    }

    pub fn with_options(mut self, options: PlanOptions) -> Self {
        self.options = options;
        self
    }

    /// Swap the detector and resolver, e.g. to fake the filesystem in tests.
    pub fn with_conflict_handling(mut self, detector: ConflictDetector, resolver: ConflictResolver) -> Self {
        self.detector = detector;
        self.resolver = resolver;
        self
    }

    pub fn build(&self, files: &[MediaFile]) -> Result<Plan, ResolveError> {
        let mut plan = Plan::new();
        self.add_changes(&mut plan, files.iter());
        self.finish(plan)
    }

    /// Build from a pipeline report, sorted by path.
    ///
    /// Files whose lookup failed become plan errors carrying the provider's
    /// message rather than a formatter error.
    pub fn build_from_report(&self, report: &EnrichReport) -> Result<Plan, ResolveError> {
        let mut plan = Plan::new();

        let mut files: Vec<&MediaFile> = report.files.iter().collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let mut failures: Vec<&crate::pipeline::MetadataFailure> = report.failures.iter().collect();
        failures.sort_by(|a, b| a.path.cmp(&b.path));
        plan.errors.extend(
            failures
                .iter()
                .map(|f| FileError::new(&f.path, f.error.to_string())),
        );

        self.add_changes(
            &mut plan,
            files.into_iter().filter(|f| report.failure_for(&f.path).is_none()),
        );
        self.finish(plan)
    }

    fn add_changes<'a>(&self, plan: &mut Plan, files: impl Iterator<Item = &'a MediaFile>) {
        for file in files {
            match self.formatter.format(file) {
                Ok(target) => {
                    let before = FileRef {
                        path: file.path.clone(),
                        filename: file.filename.clone(),
                    };
                    let after = FileRef::in_dir(file.dir(), target);
                    plan.changes.push(
                        Change::new(before, after)
                            .with_metadata(file.metadata.clone())
                            .with_strategy(file.strategy),
                    );
                }
                Err(e) => {
                    log::debug!("Cannot name {}: {}", file.path.display(), e);
                    plan.errors.push(FileError::new(&file.path, e.to_string()));
                }
            }
        }
    }

    fn finish(&self, mut plan: Plan) -> Result<Plan, ResolveError> {
        self.detector.detect_into(&mut plan);
        match self.options.strategy_override {
            Some(strategy) => self.resolver.resolve_all(&mut plan, strategy)?,
            None => self.resolver.resolve_all_by(&mut plan, strategy_for)?,
        }

        let summary = plan.summary();
        log::debug!(
            "Plan {}: {} changes ({} ready, {} noop, {} skipped), {} errors, {}/{} conflicts resolved",
            plan.id,
            summary.total_changes,
            summary.ready_changes,
            summary.noop_changes,
            summary.skipped_changes,
            summary.error_files,
            summary.resolved_conflicts,
            summary.total_conflicts
        );
        Ok(plan)
    }

    /// The resolver, for resolving conflicts left open by `prompt_user`.
    pub fn resolver(&self) -> &ConflictResolver {
        &self.resolver
    }
}

/// Strategy tag of a conflict's first change.
///
/// Renames never leave their directory, so every member of a conflict sits
/// in the same source directory and normally carries the same tag.
pub fn strategy_for(plan: &Plan, conflict: &Conflict) -> ConflictStrategy {
    conflict
        .change_ids
        .first()
        .and_then(|id| plan.change(id))
        .map(|c| c.strategy)
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "tests/plan_tests.rs"]
mod tests;
