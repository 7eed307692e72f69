use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use reelname_lib::{ApplyExecutor, FsRenamer, Settings};

use crate::cli_types::ScanArgs;
use crate::commands::plan::{build_plan, print_plan};
use crate::error::CliError;

pub(crate) fn run_apply(settings: &Settings, scan: ScanArgs, auto_approve: bool, quiet: bool) -> Result<(), CliError> {
    let plan = build_plan(settings, &scan, quiet, true)?;
    print_plan(&plan);

    if plan.has_unresolved_conflicts() {
        return Err(CliError::other(
            "Plan has unresolved conflicts; rerun interactively or pass --strategy",
        ));
    }
    let ready = plan.applicable_changes().count();
    if ready == 0 {
        log::info!("Nothing to rename.");
        return Ok(());
    }

    if !auto_approve {
        log::info!("");
        let answer = crate::prompt_line(&format!(
            "Rename {ready} files? Only 'yes' will be accepted: "
        ))?
        .unwrap_or_default();
        if answer != "yes" {
            log::info!("{}", "Apply cancelled.".if_supports_color(Stdout, |t| t.dimmed()));
            return Ok(());
        }
    }

    let journal = settings.journal_store()?;
    log::debug!("Journal: {}", journal.path().display());
    let report = ApplyExecutor::new().apply_with(&plan, &FsRenamer, &journal, |change, result| {
        if let Err(e) = result {
            log::warn!(
                "  {} {}: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                change.before.filename,
                e,
            );
        }
    });

    for warning in &report.journal_warnings {
        log::warn!(
            "  {} {} was renamed but cannot be reverted: {}",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            warning.path.display(),
            warning.error,
        );
    }

    log::info!("");
    log::info!(
        "  {} {} files renamed",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        report.applied_count(),
    );
    if !report.failures.is_empty() {
        return Err(CliError::partial(format!(
            "{} of {} renames failed",
            report.failures.len(),
            ready
        )));
    }
    Ok(())
}
