//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

use reelname_core::{ConflictStrategy, MediaKind};

#[derive(Parser)]
#[command(name = "reelname")]
#[command(about = "Preview, apply and undo metadata-driven renames of movie and TV files", long_about = None)]
pub(crate) struct Cli {
    /// Only show warnings and errors (suppress normal output)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this settings file instead of the per-user one
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which directories to scan and how to treat their files.
#[derive(Args, Clone, Default)]
pub(crate) struct ScanArgs {
    /// Directories to scan (defaults to the directories in settings)
    pub dirs: Vec<PathBuf>,

    /// Media kind for the given directories: movie, tv or auto
    #[arg(short, long)]
    pub kind: Option<MediaKind>,

    /// Conflict strategy for every conflict (skip, append_number, append_timestamp, overwrite, prompt_user)
    #[arg(short, long)]
    pub strategy: Option<ConflictStrategy>,

    /// Only scan the top level of each directory
    #[arg(long)]
    pub no_recursive: bool,

    /// Maximum concurrent metadata lookups
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Show the renames that would be made, without touching any file
    Plan {
        #[command(flatten)]
        scan: ScanArgs,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Plan, confirm and perform renames, recording each in the journal
    Apply {
        #[command(flatten)]
        scan: ScanArgs,

        /// Do not ask for confirmation
        #[arg(long)]
        auto_approve: bool,
    },

    /// Inspect or undo previously applied renames
    State {
        #[command(subcommand)]
        action: StateAction,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum StateAction {
    /// List journal entries, newest first
    Ls {
        /// Only show entries that can still be reverted
        #[arg(long)]
        active: bool,

        /// Show at most this many entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Move renamed files back to their original names
    #[command(group(ArgGroup::new("target").required(true).args(["id", "last", "all"])))]
    Revert {
        /// Entry id, or a unique prefix of one
        #[arg(long)]
        id: Option<String>,

        /// Revert the most recent active entry
        #[arg(long)]
        last: bool,

        /// Revert every active entry, newest first
        #[arg(long)]
        all: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the effective settings
    Show,

    /// Set one setting and save it
    Set {
        /// Setting name (e.g. concurrency, conflict_strategy)
        key: String,
        value: String,
    },

    /// Print the settings and journal file paths
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn revert_needs_exactly_one_selector() {
        assert!(Cli::try_parse_from(["reelname", "state", "revert"]).is_err());
        assert!(Cli::try_parse_from(["reelname", "state", "revert", "--last", "--all"]).is_err());
        assert!(Cli::try_parse_from(["reelname", "state", "revert", "--id", "abc123"]).is_ok());
    }

    #[test]
    fn scan_flags_accept_aliases() {
        let cli = Cli::try_parse_from(["reelname", "plan", "/media/tv", "--kind", "tv", "--strategy", "number"])
            .unwrap();
        let Commands::Plan { scan, json } = cli.command else {
            panic!("expected plan");
        };
        assert!(!json);
        assert_eq!(scan.dirs, vec![PathBuf::from("/media/tv")]);
        assert_eq!(scan.kind, Some(MediaKind::Episode));
        assert_eq!(scan.strategy, Some(ConflictStrategy::AppendNumber));
    }
}
