//! OMDb response envelope decoding
//!
//! Every answer from the service is a JSON object tagged with
//! `"Response": "True" | "False"`. A `"False"` body is a domain error even
//! though it arrives with a 2xx status. Bodies are decoded into
//! [`Envelope`] here and turned into typed values or [`OmdbError::Domain`];
//! nothing untyped leaves this module.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{OmdbError, Result};
use crate::params::SearchParams;
use crate::types::{MovieDetails, MovieSummary, Rating, SearchResult, SearchType};

/// Tagged OMDb envelope
#[derive(Debug, PartialEq)]
pub enum Envelope<T> {
    /// `Response: "True"` with its payload
    Success(T),
    /// `Response: "False"` with the service's message
    Failure(String),
}

#[derive(Deserialize)]
struct Tag {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
}

/// Decode a raw body into an envelope
///
/// # Errors
/// - `Decode` if the body is not JSON, lacks the `Response` tag, is a
///   failure without an `Error` message, or the payload does not match `T`
pub fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<Envelope<T>> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| OmdbError::Decode(e.to_string()))?;
    let tag = Tag::deserialize(&value).map_err(|e| OmdbError::Decode(e.to_string()))?;

    match tag.response.as_str() {
        "True" => T::deserialize(value)
            .map(Envelope::Success)
            .map_err(|e| OmdbError::Decode(e.to_string())),
        "False" => tag.error.map(Envelope::Failure).ok_or_else(|| {
            OmdbError::Decode("failure response without an Error message".to_string())
        }),
        other => Err(OmdbError::Decode(format!("unknown Response tag: {other:?}"))),
    }
}

/// Decode a body, turning a failure envelope into a domain error
///
/// # Errors
/// - `Domain` with the service's message, verbatim, for a failure envelope
/// - `Decode` as for [`decode_envelope`]
pub fn decode_payload<T: DeserializeOwned>(body: &str) -> Result<T> {
    match decode_envelope(body)? {
        Envelope::Success(payload) => Ok(payload),
        Envelope::Failure(message) => Err(OmdbError::Domain(message)),
    }
}

/// Search payload as sent by the service
#[derive(Debug, Deserialize)]
pub(crate) struct RawSearch {
    #[serde(rename = "Search", default)]
    search: Vec<RawSummary>,
    #[serde(rename = "totalResults", default)]
    total_results: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSummary {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Type", default)]
    kind: Option<String>,
    #[serde(rename = "Poster", default)]
    poster: String,
}

impl RawSummary {
    fn into_summary(self, fallback_kind: SearchType) -> MovieSummary {
        MovieSummary {
            id: self.imdb_id,
            title: self.title,
            year: self.year,
            kind: parse_kind(self.kind.as_deref(), fallback_kind),
            poster_url: self.poster,
        }
    }
}

impl RawSearch {
    /// Attach the parameters this page was fetched for
    ///
    /// # Errors
    /// - `Decode` if `totalResults` is not a number
    pub(crate) fn into_result(self, params: SearchParams) -> Result<SearchResult> {
        let total_count = match self.total_results.as_deref().map(str::trim) {
            None | Some("") => 0,
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| OmdbError::Decode(format!("invalid totalResults: {raw:?}")))?,
        };
        let items = self
            .search
            .into_iter()
            .map(|raw| raw.into_summary(params.kind))
            .collect();

        Ok(SearchResult {
            items,
            total_count,
            source_params: params,
        })
    }
}

/// Detail payload as sent by the service
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RawDetails {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    year: String,
    #[serde(rename = "Type", default)]
    kind: Option<String>,
    #[serde(default)]
    poster: String,
    #[serde(default)]
    rated: String,
    #[serde(default)]
    released: String,
    #[serde(default)]
    runtime: String,
    #[serde(default)]
    genre: String,
    #[serde(default)]
    director: String,
    #[serde(default)]
    writer: String,
    #[serde(default)]
    actors: String,
    #[serde(default)]
    plot: String,
    #[serde(default)]
    language: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    awards: String,
    #[serde(default)]
    ratings: Vec<RawRating>,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: String,
    #[serde(rename = "imdbVotes", default)]
    imdb_votes: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawRating {
    source: String,
    value: String,
}

impl From<RawDetails> for MovieDetails {
    fn from(raw: RawDetails) -> Self {
        Self {
            id: raw.imdb_id,
            title: raw.title,
            year: raw.year,
            kind: parse_kind(raw.kind.as_deref(), SearchType::Movie),
            poster_url: raw.poster,
            rated: raw.rated,
            released: raw.released,
            runtime: raw.runtime,
            genres: split_genres(&raw.genre),
            director: raw.director,
            writers: raw.writer,
            actors: raw.actors,
            plot: raw.plot,
            language: raw.language,
            country: raw.country,
            awards: raw.awards,
            ratings: raw
                .ratings
                .into_iter()
                .map(|r| Rating {
                    source: r.source,
                    value: r.value,
                })
                .collect(),
            imdb_rating: raw.imdb_rating,
            imdb_votes: raw.imdb_votes,
        }
    }
}

fn parse_kind(raw: Option<&str>, fallback: SearchType) -> SearchType {
    raw.and_then(|k| k.parse().ok()).unwrap_or(fallback)
}

/// Split the comma-separated genre list, keeping order and dropping repeats
fn split_genres(raw: &str) -> Vec<String> {
    let mut genres: Vec<String> = Vec::new();
    for genre in raw.split(',').map(str::trim) {
        if genre.is_empty() || genre == "N/A" {
            continue;
        }
        if !genres.iter().any(|g| g == genre) {
            genres.push(genre.to_string());
        }
    }
    genres
}
