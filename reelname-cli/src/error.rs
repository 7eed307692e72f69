use thiserror::Error;

use reelname_lib::{DiscoveryError, JournalError, ResolveError, RevertError, SettingsError};

/// Errors that end a CLI command.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Cannot scan: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Conflict resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("{0}")]
    Revert(#[from] RevertError),

    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Nothing failed outright, but some items did; the summary was already printed.
    #[error("{0}")]
    Partial(String),

    #[error("{0}")]
    Other(String),
}

impl CliError {
    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    pub(crate) fn partial(msg: impl Into<String>) -> Self {
        Self::Partial(msg.into())
    }

    pub(crate) fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    pub(crate) fn exit_code(&self) -> i32 {
        match self {
            Self::Partial(_) => 2,
            _ => 1,
        }
    }
}
