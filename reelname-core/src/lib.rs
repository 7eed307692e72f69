use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};

pub mod error;
pub mod journal;
pub mod metadata;
pub mod plan;
pub mod strategy;
pub mod util;

pub use error::{FormatError, ProviderError};
pub use journal::{EntryStatus, JOURNAL_VERSION, State, StateEntry};
pub use metadata::{Episode, Metadata, Movie, Show};
pub use plan::{Action, Change, Conflict, ConflictKind, FileError, FileRef, Plan, PlanSummary, Resolution};
pub use strategy::{ConflictStrategy, StrategyParseError};

/// What a media file is, either inferred at discovery time or forced by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Movie,
    Episode,
    #[default]
    Unknown,
}

impl MediaKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Episode => "episode",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error returned when a string cannot be parsed into a `MediaKind`.
#[derive(Debug, Clone)]
pub struct MediaKindParseError(pub String);

impl std::fmt::Display for MediaKindParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown media kind '{}' (expected movie, tv or auto)", self.0)
    }
}

impl std::error::Error for MediaKindParseError {}

impl std::str::FromStr for MediaKind {
    type Err = MediaKindParseError;

    /// `auto` maps to `Unknown`, which discovery replaces with a guess.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movie" | "movies" | "film" => Ok(Self::Movie),
            "tv" | "episode" | "show" | "series" => Ok(Self::Episode),
            "auto" | "unknown" => Ok(Self::Unknown),
            _ => Err(MediaKindParseError(s.to_string())),
        }
    }
}

/// A unit of work flowing through the pipeline.
///
/// The path is the file's identity; it only changes when a rename is applied,
/// and the plan records the rename rather than mutating the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFile {
    pub path: PathBuf,
    pub filename: String,
    pub kind: MediaKind,
    /// Filled in by a [`MetadataProvider`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Conflict policy of the directory the file was found in.
    #[serde(default)]
    pub strategy: ConflictStrategy,
}

impl MediaFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = util::file_name_string(&path);
        Self {
            path,
            filename,
            kind: MediaKind::Unknown,
            metadata: None,
            strategy: ConflictStrategy::default(),
        }
    }

    pub fn with_kind(mut self, kind: MediaKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_strategy(mut self, strategy: ConflictStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Directory containing the file.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    /// Extension including the leading dot, or empty.
    pub fn extension(&self) -> &str {
        util::split_extension(&self.filename).1
    }
}

/// Looks up metadata for a single file and stores it on the file.
///
/// Implementations are shared across worker tasks, so they must be safe to
/// call concurrently for distinct files. Any shared state (a rate limiter, an
/// HTTP client) has to be internally synchronized.
pub trait MetadataProvider: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Wait until the provider will accept another call.
    ///
    /// Awaited before [`provide`](Self::provide) and outside its time budget,
    /// so queueing behind a rate limit never counts as a slow lookup.
    fn ready(&self) -> impl Future<Output = ()> + Send {
        std::future::ready(())
    }

    /// Resolve metadata for `file`, writing it to `file.metadata`.
    fn provide(
        &self,
        file: &mut MediaFile,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;
}

/// Computes the target filename for a file from its metadata.
///
/// Must be a pure function of the file's metadata and kind; no I/O.
pub trait NameFormatter: Send + Sync {
    fn format(&self, file: &MediaFile) -> Result<String, FormatError>;
}

/// Moves a file on disk.
///
/// Implementations create missing parent directories of `to`.
pub trait Renamer {
    fn rename(&self, from: &Path, to: &Path) -> std::io::Result<()>;
}

impl<R: Renamer + ?Sized> Renamer for &R {
    fn rename(&self, from: &Path, to: &Path) -> std::io::Result<()> {
        (**self).rename(from, to)
    }
}
