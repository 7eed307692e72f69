use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use reelname_core::StateEntry;
use reelname_core::util::short_id;
use reelname_lib::{FsRenamer, RevertOutcome, Settings};

use crate::error::CliError;

fn describe(entry: &StateEntry) -> String {
    format!("{} \u{2192} {}", entry.new_name, entry.original_name)
}

pub(crate) fn run_state_ls(settings: &Settings, active_only: bool, limit: Option<usize>) -> Result<(), CliError> {
    let journal = settings.journal_store()?;
    let entries = journal.history(active_only, limit)?;
    if entries.is_empty() {
        log::info!("{}", "No journal entries.".if_supports_color(Stdout, |t| t.dimmed()));
        return Ok(());
    }

    for entry in &entries {
        let status = entry.status().to_string();
        let status = if entry.is_active() {
            format!("{}", status.if_supports_color(Stdout, |t| t.green()))
        } else {
            format!("{}", status.if_supports_color(Stdout, |t| t.dimmed()))
        };
        let title = entry
            .metadata
            .as_ref()
            .map(|m| format!(" [{}]", m.label()))
            .unwrap_or_default();
        log::info!(
            "{} {:<8} {} {} {} {}{}",
            short_id(&entry.id).if_supports_color(Stdout, |t| t.bold()),
            status,
            entry
                .timestamp
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S"),
            entry.original_name.if_supports_color(Stdout, |t| t.dimmed()),
            "\u{2192}",
            entry.new_name,
            title.if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    Ok(())
}

fn report_outcome(entry: &StateEntry, outcome: &RevertOutcome) {
    match outcome {
        RevertOutcome::Reverted => log::info!(
            "  {} {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            describe(entry),
        ),
        RevertOutcome::JournalStale(e) => log::warn!(
            "  {} {} (journal not updated: {})",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            describe(entry),
            e,
        ),
    }
}

pub(crate) fn run_state_revert(
    settings: &Settings,
    id: Option<String>,
    last: bool,
    all: bool,
    yes: bool,
) -> Result<(), CliError> {
    let journal = settings.journal_store()?;

    if let Some(prefix) = id {
        let full = journal.resolve_id(&prefix)?;
        let entry = journal.get_by_id(&full)?;
        let outcome = journal.revert(&full, &FsRenamer)?;
        report_outcome(&entry, &outcome);
        return Ok(());
    }

    if last {
        let (entry, outcome) = journal.revert_last(&FsRenamer)?;
        report_outcome(&entry, &outcome);
        return Ok(());
    }

    if all {
        let active = journal.get_all_active()?.len();
        if active == 0 {
            log::info!("No active entries to revert.");
            return Ok(());
        }
        if !yes {
            let answer = crate::prompt_line(&format!("Revert {active} renames? [y/N] "))?.unwrap_or_default();
            if !answer.eq_ignore_ascii_case("y") && !answer.eq_ignore_ascii_case("yes") {
                log::info!("{}", "Revert cancelled.".if_supports_color(Stdout, |t| t.dimmed()));
                return Ok(());
            }
        }

        let report = journal.revert_all(&FsRenamer)?;
        for entry in &report.reverted {
            report_outcome(entry, &RevertOutcome::Reverted);
        }
        for (entry, e) in &report.stale {
            log::warn!(
                "  {} {} (journal not updated: {})",
                "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                describe(entry),
                e,
            );
        }
        for (entry, e) in &report.failed {
            log::warn!(
                "  {} {} [{}]: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                describe(entry),
                short_id(&entry.id),
                e,
            );
        }

        log::info!("");
        log::info!(
            "{} {} of {} reverted",
            "Summary:".if_supports_color(Stdout, |t| t.bold()),
            report.restored_count(),
            report.total(),
        );
        if !report.failed.is_empty() {
            return Err(CliError::partial(format!(
                "{} entries could not be reverted",
                report.failed.len()
            )));
        }
        return Ok(());
    }

    Err(CliError::other("Specify one of --id, --last or --all"))
}
