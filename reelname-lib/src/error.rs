use std::path::PathBuf;

use thiserror::Error;

/// The root of a scan could not be enumerated. Fatal to the batch.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("cannot read directory {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),
}

/// Aggregate outcome of a metadata batch with per-file failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{failed} of {total} files failed metadata lookup")]
    SomeFilesFailed { failed: usize, total: usize },
}

/// Fatal errors while resolving a plan's conflicts.
///
/// The plan is left partially resolved and must be rebuilt before applying.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("strategy '{0}' cannot be applied automatically")]
    UnsupportedStrategy(String),

    #[error("conflict {id} is malformed: {reason}")]
    MalformedConflict { id: String, reason: String },

    #[error("conflict {conflict} references unknown change {change}")]
    UnknownChange { conflict: String, change: String },

    #[error("no conflict with id {0}")]
    UnknownConflict(String),

    #[error("conflict {0} is already resolved")]
    AlreadyResolved(String),
}

impl ResolveError {
    pub fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedConflict {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Errors reading or writing the journal file.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("journal {path} is not valid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize journal: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("journal version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: String, supported: String },

    #[error("no journal entry with id {0}")]
    EntryNotFound(String),

    #[error("id prefix '{0}' matches more than one journal entry")]
    AmbiguousId(String),

    #[error("no per-user configuration directory available")]
    NoConfigDir,
}

impl JournalError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A single revert was refused or failed. Batch reverts continue past these.
#[derive(Debug, Error)]
pub enum RevertError {
    #[error("no journal entry with id {0}")]
    NotFound(String),

    #[error("entry {0} has already been reverted")]
    AlreadyReverted(String),

    #[error("renamed file {0} no longer exists")]
    SourceMissing(PathBuf),

    #[error("cannot restore to {0}: a file already exists there")]
    DestinationOccupied(PathBuf),

    #[error("no active entries to revert")]
    NoActiveEntries,

    #[error("failed to move {from} back to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Journal(#[from] JournalError),
}

impl RevertError {
    /// Whether the refusal happened before anything on disk was touched.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::AlreadyReverted(_)
                | Self::SourceMissing(_)
                | Self::DestinationOccupied(_)
                | Self::NoActiveEntries
        )
    }
}

/// Errors loading, validating or saving settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid setting {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("unknown setting '{0}'")]
    UnknownKey(String),

    #[error("no per-user configuration directory available")]
    NoConfigDir,
}

impl SettingsError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
