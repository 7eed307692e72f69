//! Plex-style target filenames.

use reelname_core::{Episode, FormatError, MediaFile, MediaKind, Metadata, Movie, NameFormatter};

/// Renders `Title (Year).ext` for movies and `Show - S01E02 - Title.ext` for
/// episodes. The source file's extension is kept as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlexFormatter;

impl PlexFormatter {
    pub fn new() -> Self {
        Self
    }

    fn movie_name(movie: &Movie) -> String {
        match movie.release_year() {
            Some(year) => format!("{} ({})", movie.title, year),
            None => movie.title.clone(),
        }
    }

    fn episode_name(episode: &Episode) -> String {
        match episode.title.as_deref().filter(|t| !t.trim().is_empty()) {
            Some(title) => format!("{} - {} - {}", episode.show.name, episode.code(), title),
            None => format!("{} - {}", episode.show.name, episode.code()),
        }
    }
}

impl NameFormatter for PlexFormatter {
    fn format(&self, file: &MediaFile) -> Result<String, FormatError> {
        let metadata = file.metadata.as_ref().ok_or(FormatError::MissingMetadata)?;
        if file.kind != MediaKind::Unknown && file.kind != metadata.kind() {
            return Err(FormatError::KindMismatch {
                expected: file.kind,
                found: metadata.kind(),
            });
        }

        let base = match metadata {
            Metadata::Movie(movie) => Self::movie_name(movie),
            Metadata::Episode(episode) => Self::episode_name(episode),
        };
        let name = sanitize_filename(&base);
        if name.is_empty() {
            return Err(FormatError::EmptyName);
        }
        Ok(format!("{}{}", name, file.extension()))
    }
}

/// Replace or drop characters that are not portable in filenames, then
/// collapse runs of whitespace.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            ':' => out.push_str(" -"),
            '"' => out.push('\''),
            '*' | '?' | '<' | '>' | '|' | '/' | '\\' => {}
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelname_core::Show;

    fn file_with(name: &str, metadata: Metadata) -> MediaFile {
        MediaFile::new(format!("/media/{name}")).with_metadata(metadata)
    }

    #[test]
    fn movie_with_year() {
        let file = file_with(
            "Movie.Name.2020.1080p.mkv",
            Metadata::Movie(Movie::new("Movie Name").with_year(2020)),
        );
        assert_eq!(PlexFormatter.format(&file).unwrap(), "Movie Name (2020).mkv");
    }

    #[test]
    fn movie_year_from_release_date() {
        let mut movie = Movie::new("Dated");
        movie.release_date = chrono::NaiveDate::from_ymd_opt(1999, 3, 31);
        let file = file_with("x.mp4", Metadata::Movie(movie));
        assert_eq!(PlexFormatter.format(&file).unwrap(), "Dated (1999).mp4");
    }

    #[test]
    fn episode_with_and_without_title() {
        let ep = Episode::new(Show::new("Show"), 1, 1);
        let file = file_with("Show.S01E01.mkv", Metadata::Episode(ep.clone().with_title("Pilot")));
        assert_eq!(PlexFormatter.format(&file).unwrap(), "Show - S01E01 - Pilot.mkv");

        let file = file_with("Show.S01E01.mkv", Metadata::Episode(ep));
        assert_eq!(PlexFormatter.format(&file).unwrap(), "Show - S01E01.mkv");
    }

    #[test]
    fn hostile_characters_are_sanitized() {
        let file = file_with(
            "a.mkv",
            Metadata::Movie(Movie::new("Mission: Impossible / \"Cut\"?").with_year(1996)),
        );
        assert_eq!(
            PlexFormatter.format(&file).unwrap(),
            "Mission - Impossible 'Cut' (1996).mkv"
        );
    }

    #[test]
    fn missing_metadata_is_an_error() {
        let file = MediaFile::new("/media/a.mkv");
        assert_eq!(PlexFormatter.format(&file), Err(FormatError::MissingMetadata));
    }

    #[test]
    fn kind_mismatch_is_an_error() {
        let file = file_with("a.mkv", Metadata::Movie(Movie::new("A"))).with_kind(MediaKind::Episode);
        assert!(matches!(
            PlexFormatter.format(&file),
            Err(FormatError::KindMismatch { .. })
        ));
    }

    #[test]
    fn name_that_sanitizes_to_nothing_is_an_error() {
        let file = file_with("a.mkv", Metadata::Movie(Movie::new("???")));
        assert_eq!(PlexFormatter.format(&file), Err(FormatError::EmptyName));
    }
}
