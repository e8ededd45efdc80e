//! Core data types for the movie search
//!
//! Contains the main data structures used throughout the library.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OmdbError;
use crate::params::SearchParams;

/// Poster value the service uses when no image exists
pub const POSTER_SENTINEL: &str = "N/A";

/// Number of items the service returns per search page
pub const PAGE_SIZE: u32 = 10;

/// Kind of title to search for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Feature films
    #[default]
    Movie,
    /// TV series
    Series,
    /// Single episodes
    Episode,
}

impl SearchType {
    /// All variants, in display order
    pub const ALL: [Self; 3] = [Self::Movie, Self::Series, Self::Episode];

    /// Wire name used in query strings
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
            Self::Episode => "episode",
        }
    }

    /// Human-readable label for selectors
    pub fn label(self) -> &'static str {
        match self {
            Self::Movie => "Movies",
            Self::Series => "TV Series",
            Self::Episode => "Episodes",
        }
    }

    /// Whether switching from `self` to `next` should clear the search text
    ///
    /// Episode titles rarely overlap with movie or series titles, so moving
    /// into or out of episode search starts over.
    pub fn switch_clears_text(self, next: Self) -> bool {
        self != next && (self == Self::Episode || next == Self::Episode)
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = OmdbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(Self::Movie),
            "series" => Ok(Self::Series),
            "episode" => Ok(Self::Episode),
            other => Err(OmdbError::Validation(format!("unknown search type: {other}"))),
        }
    }
}

/// One entry of a search result page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    /// IMDb identifier (e.g., "tt0133093")
    pub id: String,

    /// Title
    pub title: String,

    /// Release year or year range (e.g., "1999" or "2008–2013")
    pub year: String,

    /// Kind of title
    pub kind: SearchType,

    /// Poster URL, or [`POSTER_SENTINEL`] when there is none
    pub poster_url: String,
}

impl MovieSummary {
    /// Poster URL if the service provided a real one
    pub fn poster(&self) -> Option<&str> {
        poster_or_none(&self.poster_url)
    }

    /// Link to the title's IMDb page
    pub fn imdb_url(&self) -> String {
        imdb_url(&self.id)
    }
}

/// A single third-party rating of a title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    /// Rating source (e.g., "Rotten Tomatoes")
    pub source: String,
    /// Rating value as published (e.g., "88%")
    pub value: String,
}

/// Full details of a single title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: String,
    pub title: String,
    pub year: String,
    pub kind: SearchType,
    pub poster_url: String,
    pub rated: String,
    pub released: String,
    pub runtime: String,
    /// Genres in the order the service lists them, without duplicates
    pub genres: Vec<String>,
    pub director: String,
    pub writers: String,
    pub actors: String,
    pub plot: String,
    pub language: String,
    pub country: String,
    pub awards: String,
    pub ratings: Vec<Rating>,
    pub imdb_rating: String,
    pub imdb_votes: String,
}

impl MovieDetails {
    /// Poster URL if the service provided a real one
    pub fn poster(&self) -> Option<&str> {
        poster_or_none(&self.poster_url)
    }

    /// Link to the title's IMDb page
    pub fn imdb_url(&self) -> String {
        imdb_url(&self.id)
    }
}

/// One fetched page of search results
///
/// Never mutated after creation; a new fetch produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Matches on this page, in service order
    pub items: Vec<MovieSummary>,

    /// Total matches across all pages
    pub total_count: u32,

    /// Parameters this page was fetched for
    pub source_params: SearchParams,
}

impl SearchResult {
    /// Number of pages needed to show every match
    pub fn page_count(&self, page_size: u32) -> u32 {
        page_count(self.total_count, page_size)
    }
}

/// `ceil(total / page_size)`, zero for an empty page size
pub fn page_count(total: u32, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Builds the IMDb page URL for an identifier
///
/// # Example
/// ```
/// use cinesearch_core::types::imdb_url;
/// assert_eq!(imdb_url("tt0133093"), "https://www.imdb.com/title/tt0133093");
/// ```
pub fn imdb_url(id: &str) -> String {
    format!("https://www.imdb.com/title/{id}")
}

fn poster_or_none(url: &str) -> Option<&str> {
    if url.is_empty() || url == POSTER_SENTINEL {
        None
    } else {
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(poster: &str) -> MovieSummary {
        MovieSummary {
            id: "tt0133093".to_string(),
            title: "The Matrix".to_string(),
            year: "1999".to_string(),
            kind: SearchType::Movie,
            poster_url: poster.to_string(),
        }
    }

    #[test]
    fn test_search_type_parse() {
        assert_eq!("series".parse::<SearchType>().unwrap(), SearchType::Series);
        assert!("game".parse::<SearchType>().is_err());
        assert_eq!(SearchType::default(), SearchType::Movie);
    }

    #[test]
    fn test_search_type_serialization() {
        let json = serde_json::to_string(&SearchType::Episode).unwrap();
        assert_eq!(json, "\"episode\"");
    }

    #[test]
    fn test_switch_clears_text() {
        assert!(SearchType::Movie.switch_clears_text(SearchType::Episode));
        assert!(SearchType::Episode.switch_clears_text(SearchType::Series));
        assert!(!SearchType::Movie.switch_clears_text(SearchType::Series));
        assert!(!SearchType::Episode.switch_clears_text(SearchType::Episode));
    }

    #[test]
    fn test_poster_sentinel() {
        assert_eq!(summary("N/A").poster(), None);
        assert_eq!(summary("").poster(), None);
        assert_eq!(
            summary("https://example.com/p.jpg").poster(),
            Some("https://example.com/p.jpg")
        );
    }

    #[test]
    fn test_imdb_link() {
        assert_eq!(summary("N/A").imdb_url(), "https://www.imdb.com/title/tt0133093");
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(25, PAGE_SIZE), 3);
        assert_eq!(page_count(10, PAGE_SIZE), 1);
        assert_eq!(page_count(0, PAGE_SIZE), 0);
        assert_eq!(page_count(11, PAGE_SIZE), 2);
        assert_eq!(page_count(5, 0), 0);
    }
}
