use std::io::IsTerminal;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use reelname_core::{Action, ConflictStrategy, MediaFile, MetadataProvider, Plan};
use reelname_lib::async_util::run_with_events;
use reelname_lib::plan::PlanOptions;
use reelname_lib::{
    ConflictResolver, DirectoryConfig, EnrichEvent, EnrichReport, FilenameProvider, MetadataPipeline,
    PipelineConfig, PlanBuilder, PlexFormatter, RateLimited, Settings, discover,
};

use crate::cli_types::ScanArgs;
use crate::error::CliError;

/// Directories to scan: the ones named on the command line, else the configured ones.
fn target_directories(settings: &Settings, scan: &ScanArgs) -> Result<Vec<DirectoryConfig>, CliError> {
    let mut dirs: Vec<DirectoryConfig> = if scan.dirs.is_empty() {
        settings.directories.clone()
    } else {
        scan.dirs.iter().map(DirectoryConfig::new).collect()
    };
    if dirs.is_empty() {
        return Err(CliError::other(
            "No directories given and none configured (see `reelname config path`)",
        ));
    }
    for dir in &mut dirs {
        if let Some(kind) = scan.kind {
            dir.kind = kind;
        }
        if scan.no_recursive {
            dir.recursive = false;
        }
    }
    Ok(dirs)
}

fn scan_all(settings: &Settings, scan: &ScanArgs) -> Result<Vec<MediaFile>, CliError> {
    let mut files = Vec::new();
    for dir in target_directories(settings, scan)? {
        let options = settings.scan_options(&dir);
        log::debug!(
            "Scanning {} (kind {}, recursive {}, strategy {})",
            dir.path.display(),
            options.kind,
            options.recursive,
            options.strategy
        );
        let found = discover(&dir.path, &options)?;
        log::info!(
            "Found {} video files in {}",
            found.len(),
            dir.path.display().if_supports_color(Stdout, |t| t.cyan()),
        );
        files.extend(found);
    }
    Ok(files)
}

async fn enrich_with<P: MetadataProvider + 'static>(
    pipeline: &MetadataPipeline,
    files: Vec<MediaFile>,
    provider: P,
    quiet: bool,
) -> EnrichReport {
    let total = files.len() as u64;
    let pb = if quiet || total == 0 {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::with_template("  {spinner:.cyan} [{bar:30.cyan/dim}] {pos}/{len} {msg}")
                .expect("static pattern")
                .progress_chars("=> "),
        );
        pb
    };

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let task = pipeline.enrich(files, Arc::new(provider), Some(tx));
    let report = run_with_events(task, rx, |event| match event {
        EnrichEvent::Started { path } => {
            pb.set_message(reelname_core::util::file_name_string(&path));
        }
        EnrichEvent::Finished { .. } => pb.inc(1),
        EnrichEvent::Failed { path, error } => {
            pb.inc(1);
            log::debug!("{}: {}", path.display(), error);
        }
    })
    .await;
    pb.finish_and_clear();
    report
}

/// Scan, enrich and plan. Open `prompt_user` conflicts are put to the user
/// when `interactive` is set and stdin is a terminal.
pub(crate) fn build_plan(
    settings: &Settings,
    scan: &ScanArgs,
    quiet: bool,
    interactive: bool,
) -> Result<Plan, CliError> {
    let files = scan_all(settings, scan)?;

    let mut pipeline_config: PipelineConfig = settings.pipeline_config();
    if let Some(n) = scan.concurrency {
        pipeline_config.concurrency = n.max(1);
    }
    let pipeline = MetadataPipeline::new(pipeline_config);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {e}")))?;
    let report = rt.block_on(async {
        match settings.rate_limiter() {
            Some(limiter) => {
                enrich_with(&pipeline, files, RateLimited::new(FilenameProvider, limiter), quiet).await
            }
            None => enrich_with(&pipeline, files, FilenameProvider, quiet).await,
        }
    });
    if let Some(err) = report.aggregate_error() {
        log::warn!(
            "  {} {}",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            err,
        );
    }

    let builder = PlanBuilder::new(PlexFormatter).with_options(PlanOptions {
        strategy_override: scan.strategy,
    });
    let mut plan = builder.build_from_report(&report)?;

    if interactive && plan.has_unresolved_conflicts() && std::io::stdin().is_terminal() {
        prompt_conflicts(&mut plan, builder.resolver())?;
    }
    Ok(plan)
}

/// Ask for a strategy for each open conflict.
fn prompt_conflicts(plan: &mut Plan, resolver: &ConflictResolver) -> Result<(), CliError> {
    let choices: Vec<ConflictStrategy> = ConflictStrategy::all()
        .iter()
        .copied()
        .filter(|s| s.is_automatic())
        .collect();
    let ids: Vec<String> = plan.unresolved_conflicts().map(|c| c.id.clone()).collect();

    for id in ids {
        let Some(conflict) = plan.conflict(&id) else {
            continue;
        };
        log::info!("");
        log::info!(
            "{} {} ({})",
            "Conflict:".if_supports_color(Stdout, |t| t.yellow()),
            conflict.target_path.display(),
            conflict.kind,
        );
        for change_id in &conflict.change_ids {
            if let Some(change) = plan.change(change_id) {
                log::info!("    {}", change.before.path.display());
            }
        }

        let names: Vec<&str> = choices.iter().map(|s| s.name()).collect();
        let prompt = format!("  Strategy [{}]: ", names.join(", "));
        let Some(strategy) = ask_strategy(|| crate::prompt_line(&prompt))? else {
            log::warn!("No answer; remaining conflicts stay unresolved");
            break;
        };
        resolver.resolve_conflict(plan, &id, strategy)?;
    }
    Ok(())
}

/// Ask until an automatic strategy is given. `None` once input runs out.
fn ask_strategy(
    mut next_answer: impl FnMut() -> Result<Option<String>, CliError>,
) -> Result<Option<ConflictStrategy>, CliError> {
    while let Some(answer) = next_answer()? {
        match answer.parse::<ConflictStrategy>() {
            Ok(s) if s.is_automatic() => return Ok(Some(s)),
            Ok(_) => log::warn!("  Pick one of the listed strategies"),
            Err(e) => log::warn!("  {e}"),
        }
    }
    Ok(None)
}

/// Print changes, errors and conflicts followed by a summary line.
pub(crate) fn print_plan(plan: &Plan) {
    for change in &plan.changes {
        match change.action {
            Action::Rename if change.is_conflicting() => log::warn!(
                "  {} {} {} {} {}",
                "!".if_supports_color(Stdout, |t| t.yellow()),
                change.before.filename.if_supports_color(Stdout, |t| t.dimmed()),
                "\u{2192}".if_supports_color(Stdout, |t| t.yellow()),
                change.after.filename,
                "(unresolved conflict)".if_supports_color(Stdout, |t| t.yellow()),
            ),
            Action::Rename => log::info!(
                "  {} {} {} {}",
                change.action.symbol().if_supports_color(Stdout, |t| t.green()),
                change.before.filename.if_supports_color(Stdout, |t| t.dimmed()),
                "\u{2192}".if_supports_color(Stdout, |t| t.green()),
                change.after.filename.if_supports_color(Stdout, |t| t.bold()),
            ),
            Action::Skip => log::info!(
                "  {} {} {}",
                change.action.symbol().if_supports_color(Stdout, |t| t.yellow()),
                change.before.filename.if_supports_color(Stdout, |t| t.dimmed()),
                format!("(skipped, would be {})", change.after.filename)
                    .if_supports_color(Stdout, |t| t.dimmed()),
            ),
            Action::Noop => log::debug!("    {} (already named)", change.before.filename),
        }
    }

    for error in &plan.errors {
        log::warn!(
            "  {} {}: {}",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            reelname_core::util::file_name_string(&error.file),
            error.message,
        );
    }

    for conflict in plan.conflicts.iter().filter(|c| c.resolved) {
        if let Some(resolution) = &conflict.resolution {
            log::debug!(
                "    {} conflict on {} resolved with {}",
                conflict.kind,
                conflict.target_path.display(),
                resolution.strategy
            );
        }
    }

    let s = plan.summary();
    log::info!("");
    log::info!(
        "{} {} to rename, {} already named, {} skipped, {} errors, {}/{} conflicts resolved",
        "Plan:".if_supports_color(Stdout, |t| t.bold()),
        s.ready_changes,
        s.noop_changes,
        s.skipped_changes,
        s.error_files,
        s.resolved_conflicts,
        s.total_conflicts,
    );
}

pub(crate) fn run_plan(settings: &Settings, scan: ScanArgs, json: bool, quiet: bool) -> Result<(), CliError> {
    let plan = build_plan(settings, &scan, quiet || json, !json)?;
    if json {
        let out = serde_json::to_string_pretty(&plan).map_err(|e| CliError::other(e.to_string()))?;
        println!("{out}");
        return Ok(());
    }
    print_plan(&plan);
    Ok(())
}
