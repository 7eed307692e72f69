//! reelname CLI
//!
//! Plans metadata-driven renames of movie and TV files, applies them after
//! confirmation, and reverts them from the journal.

mod cli_types;
mod commands;
mod error;

use std::io::{BufRead, Write};

use clap::Parser;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use reelname_lib::Settings;
use reelname_lib::settings::settings_path;

use crate::cli_types::{Cli, Commands, ConfigAction, StateAction};
use crate::error::CliError;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "error:".if_supports_color(Stderr, |t| t.red()), e);
        std::process::exit(e.exit_code());
    }
}

/// Normal output goes through `log` at info level, so `--quiet` hides it.
/// `RUST_LOG` overrides the level chosen by flags.
fn init_logging(quiet: bool, verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else if quiet {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).target(env_logger::Target::Stdout);
    if verbose {
        builder.format_timestamp_millis();
    } else {
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    }
    builder.parse_default_env();
    builder.init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let path = match cli.settings {
        Some(p) => p,
        None => settings_path()?,
    };
    let settings = Settings::load_from(&path)?;
    log::debug!("Settings loaded from {}", path.display());

    match cli.command {
        Commands::Plan { scan, json } => commands::plan::run_plan(&settings, scan, json, cli.quiet),
        Commands::Apply { scan, auto_approve } => {
            commands::apply::run_apply(&settings, scan, auto_approve, cli.quiet)
        }
        Commands::State { action } => match action {
            StateAction::Ls { active, limit } => commands::state::run_state_ls(&settings, active, limit),
            StateAction::Revert { id, last, all, yes } => {
                commands::state::run_state_revert(&settings, id, last, all, yes)
            }
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(&settings, &path),
            ConfigAction::Set { key, value } => commands::config::run_config_set(settings, &path, &key, &value),
            ConfigAction::Path => commands::config::run_config_path(&settings, &path),
        },
    }
}

/// Print `prompt` and read one trimmed line from stdin.
///
/// `None` means stdin reached end of input.
pub(crate) fn prompt_line(prompt: &str) -> Result<Option<String>, CliError> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    Ok(read_answer(&mut std::io::stdin().lock())?)
}

fn read_answer(input: &mut impl BufRead) -> std::io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_answer_trims_and_reports_end_of_input() {
        let mut input = Cursor::new("  yes \n\n");
        assert_eq!(read_answer(&mut input).unwrap().as_deref(), Some("yes"));
        assert_eq!(read_answer(&mut input).unwrap().as_deref(), Some(""));
        assert_eq!(read_answer(&mut input).unwrap(), None);
    }
}
