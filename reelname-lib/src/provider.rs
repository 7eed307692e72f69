//! Offline metadata provider that reads titles, years and episode numbers
//! straight out of release-style filenames.

use std::future::Future;
use std::sync::LazyLock;

use regex::Regex;
use reelname_core::util::split_extension;
use reelname_core::{Episode, MediaFile, MediaKind, Metadata, MetadataProvider, Movie, ProviderError, Show};

static EPISODE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bs(\d{1,2})[ .]?e(\d{1,3})\b|\b(\d{1,2})x(\d{1,3})\b").expect("static pattern")
});

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").expect("static pattern"));

static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]|\{[^}]*\}").expect("static pattern"));

/// Release tags that end the human-readable part of a name.
static NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(\d{3,4}p|4k|uhd|[xh]\.?26[45]|hevc|avc|10bit|bluray|blu-ray|brrip|bdrip|web-?dl|webrip|hdtv|dvdrip|hdrip|remux|aac|ac3|dts|flac|ddp?\d?|repack|extended|unrated|remastered)(-.*)?$",
    )
    .expect("static pattern")
});

/// Whether a filename carries a season/episode marker such as `S01E02` or `1x02`.
pub fn looks_like_episode(filename: &str) -> bool {
    EPISODE_MARKER.is_match(&filename.replace('_', " "))
}

/// Derive metadata from a filename.
///
/// `Unknown` tries an episode parse first and falls back to a movie.
pub fn parse_filename(filename: &str, kind: MediaKind) -> Option<Metadata> {
    let stem = split_extension(filename).0.replace('_', " ");
    match kind {
        MediaKind::Movie => parse_movie(&stem),
        MediaKind::Episode => parse_episode(&stem),
        MediaKind::Unknown => parse_episode(&stem).or_else(|| parse_movie(&stem)),
    }
}

fn parse_movie(stem: &str) -> Option<Metadata> {
    // The last year with a title in front of it, so "2001.A.Space.Odyssey.1968" keeps its title.
    let year = YEAR
        .captures_iter(stem)
        .filter_map(|c| c.get(1))
        .filter(|m| !clean_words(&stem[..m.start()]).is_empty())
        .last();

    let (title, year) = match year {
        Some(m) => (clean_words(&stem[..m.start()]), m.as_str().parse().ok()),
        None => (clean_words(stem), None),
    };
    if title.is_empty() {
        return None;
    }

    let mut movie = Movie::new(title);
    movie.year = year;
    Some(Metadata::Movie(movie))
}

fn parse_episode(stem: &str) -> Option<Metadata> {
    let caps = EPISODE_MARKER.captures(stem)?;
    let whole = caps.get(0)?;
    let season = caps.get(1).or_else(|| caps.get(3))?.as_str().parse().ok()?;
    let number = caps.get(2).or_else(|| caps.get(4))?.as_str().parse().ok()?;

    let show = clean_words(&stem[..whole.start()]);
    if show.is_empty() {
        return None;
    }

    let mut episode = Episode::new(Show::new(show), season, number);
    let title = clean_words(&stem[whole.end()..]);
    if !title.is_empty() {
        episode.title = Some(title);
    }
    Some(Metadata::Episode(episode))
}

/// Turn a dotted release fragment into words, stopping at the first release tag.
fn clean_words(raw: &str) -> String {
    let spaced = BRACKETED.replace_all(raw, " ").replace('.', " ");
    let words: Vec<&str> = spaced
        .split_whitespace()
        .take_while(|w| !NOISE.is_match(w))
        .collect();
    words
        .join(" ")
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '(' | ')' | '['))
        .to_string()
}

/// Provider that needs no network: everything comes from the filename.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameProvider;

impl MetadataProvider for FilenameProvider {
    fn name(&self) -> &'static str {
        "filename"
    }

    fn provide(
        &self,
        file: &mut MediaFile,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send {
        let result = match parse_filename(&file.filename, file.kind) {
            Some(metadata) => {
                file.metadata = Some(metadata);
                Ok(())
            }
            None => Err(ProviderError::not_found(file.filename.clone())),
        };
        std::future::ready(result)
    }
}

#[cfg(test)]
#[path = "tests/provider_tests.rs"]
mod tests;
