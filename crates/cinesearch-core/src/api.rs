//! `MovieApi` trait definition.

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::params::SearchParams;
use crate::types::{MovieDetails, SearchResult};

/// Movie metadata API.
///
/// Abstracts the two request shapes so controllers can run against a fake
/// in tests. Uses `trait_variant::make` to generate a `Send`-bound async
/// trait.
#[trait_variant::make(MovieApi: Send)]
pub trait LocalMovieApi {
    /// Searches titles by text, type, year and page.
    ///
    /// # Errors
    ///
    /// Validation, domain, transport or cancellation errors.
    async fn search(&self, params: &SearchParams, cancel: &CancelToken) -> Result<SearchResult>;

    /// Fetches full details for one title.
    ///
    /// # Errors
    ///
    /// Validation, domain, transport or cancellation errors.
    async fn movie_by_id(&self, id: &str, cancel: &CancelToken) -> Result<MovieDetails>;
}
