use thiserror::Error;

use crate::MediaKind;

/// Errors a [`MetadataProvider`](crate::MetadataProvider) can report for a single file.
///
/// These never abort a batch; the pipeline records them against the file.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider found no match for the file
    #[error("no metadata found for '{0}'")]
    NotFound(String),

    /// The lookup exceeded its time budget
    #[error("metadata lookup timed out after {0}s")]
    Timeout(u64),

    /// The batch was cancelled before this file was looked up
    #[error("metadata lookup cancelled")]
    Cancelled,

    /// The provider panicked while handling this file
    #[error("metadata provider panicked: {0}")]
    Panicked(String),
}

impl ProviderError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

/// Errors a [`NameFormatter`](crate::NameFormatter) can report for a single file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The file has no resolved metadata to format from
    #[error("file has no metadata")]
    MissingMetadata,

    /// The file's media kind disagrees with its metadata
    #[error("media kind {expected} does not match {found} metadata")]
    KindMismatch { expected: MediaKind, found: MediaKind },

    /// Formatting produced an empty filename
    #[error("formatted filename is empty")]
    EmptyName,
}
