//! Resolved metadata attached to a media file.
//!
//! A file resolves to either a movie or a single episode of a show. The two
//! cases are a closed sum type so formatters and the journal serializer can
//! match exhaustively.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A movie record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Movie {
    /// Provider-specific identifier, if the provider has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

impl Movie {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Release year, taken from `year` or else from `release_date`.
    pub fn release_year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.year.or_else(|| self.release_date.map(|d| d.year()))
    }
}

/// The show an episode belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Show {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_air_year: Option<i32>,
}

impl Show {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A single episode together with its show.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Episode {
    pub show: Show,
    pub season: u32,
    pub episode: u32,
    /// Episode title, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date: Option<NaiveDate>,
}

impl Episode {
    pub fn new(show: Show, season: u32, episode: u32) -> Self {
        Self {
            show,
            season,
            episode,
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// `S01E02` style code.
    pub fn code(&self) -> String {
        format!("S{:02}E{:02}", self.season, self.episode)
    }
}

/// Metadata resolved for a file by a [`MetadataProvider`](crate::MetadataProvider).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Metadata {
    Movie(Movie),
    Episode(Episode),
}

impl Metadata {
    /// Short human-readable label: movie title (with year) or show name + episode code.
    pub fn label(&self) -> String {
        match self {
            Metadata::Movie(movie) => match movie.release_year() {
                Some(year) => format!("{} ({})", movie.title, year),
                None => movie.title.clone(),
            },
            Metadata::Episode(ep) => format!("{} {}", ep.show.name, ep.code()),
        }
    }

    /// The media kind this metadata describes.
    pub fn kind(&self) -> crate::MediaKind {
        match self {
            Metadata::Movie(_) => crate::MediaKind::Movie,
            Metadata::Episode(_) => crate::MediaKind::Episode,
        }
    }
}
