//! Directory discovery for video files.
//!
//! Produces a sorted, deduplicated list of [`MediaFile`]s for one configured
//! directory. Subdirectories that cannot be read are skipped with a warning;
//! only an unreadable root aborts the scan.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use reelname_core::util::extension_lower;
use reelname_core::{ConflictStrategy, MediaFile, MediaKind};

use crate::error::DiscoveryError;
use crate::provider::looks_like_episode;

/// Video extensions recognised by discovery (lowercase, no dot).
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "3gp", "ogv",
];

/// What to scan and how to tag the files found.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub recursive: bool,
    /// `Unknown` means guess per file from its name.
    pub kind: MediaKind,
    pub strategy: ConflictStrategy,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            kind: MediaKind::Unknown,
            strategy: ConflictStrategy::default(),
        }
    }
}

/// Whether a path has one of the [`VIDEO_EXTENSIONS`] (case-insensitive).
pub fn is_video_file(path: &Path) -> bool {
    extension_lower(path)
        .map(|e| VIDEO_EXTENSIONS.contains(&e.as_str()))
        .unwrap_or(false)
}

/// Guess the media kind from a filename: a season/episode marker means TV.
pub fn guess_kind(filename: &str) -> MediaKind {
    if looks_like_episode(filename) {
        MediaKind::Episode
    } else {
        MediaKind::Movie
    }
}

/// Scan `root` for video files.
pub fn discover(root: &Path, options: &ScanOptions) -> Result<Vec<MediaFile>, DiscoveryError> {
    if !root.is_dir() {
        if root.exists() {
            return Err(DiscoveryError::NotADirectory(root.to_path_buf()));
        }
        return Err(DiscoveryError::Unreadable {
            path: root.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "directory not found"),
        });
    }

    let mut paths = Vec::new();
    collect_video_files(root, options.recursive, &mut paths).map_err(|source| {
        DiscoveryError::Unreadable {
            path: root.to_path_buf(),
            source,
        }
    })?;

    paths.sort();
    let mut seen = HashSet::new();
    paths.retain(|p| seen.insert(p.clone()));

    let files: Vec<MediaFile> = paths
        .into_iter()
        .map(|path| {
            let file = MediaFile::new(path).with_strategy(options.strategy);
            let kind = match options.kind {
                MediaKind::Unknown => guess_kind(&file.filename),
                forced => forced,
            };
            file.with_kind(kind)
        })
        .collect();

    log::debug!("Discovered {} video files under {}", files.len(), root.display());
    Ok(files)
}

/// Collect matching files under `dir`. Errors reading `dir` itself propagate;
/// errors in subdirectories are logged and skipped.
fn collect_video_files(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    let mut entries: Vec<std::fs::DirEntry> = std::fs::read_dir(dir)?.flatten().collect();
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(_) => continue,
        };

        if file_type.is_dir() {
            if recursive
                && let Err(e) = collect_video_files(&path, true, out)
            {
                log::warn!("Skipping unreadable directory {}: {}", path.display(), e);
            }
        } else if path.is_file() && is_video_file(&path) {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/scanner_tests.rs"]
mod tests;
