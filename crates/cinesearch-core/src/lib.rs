//! Cinesearch Core Library
//!
//! Search state, fetching and presentation for an OMDb-backed movie browser.
//!
//! # Overview
//!
//! This crate provides the whole non-visual side of the app:
//! - Search parameters kept in sync with a shareable URL query string
//! - Debounced, cached and deduplicated search requests where only the
//!   latest key's result is ever shown
//! - Detail lookup by id with bounded retries
//! - Pure mapping of fetch state to what the page shows
//! - Streaming AI chat about a movie and persisted theme settings
//!
//! # Example
//!
//! ```no_run
//! use cinesearch_core::{
//!     MemoryLocation, OmdbClient, Result, SearchController, SearchParams, SearchQueryState,
//!     view::render_search,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = OmdbClient::new("your-api-key")?;
//!     let controller = SearchController::new(client);
//!
//!     // Restore the search from the URL, or seed the defaults
//!     let mut query = SearchQueryState::mount(
//!         MemoryLocation::new("?s=batman&type=movie&page=1"),
//!         SearchParams::default(),
//!     );
//!
//!     controller.update(query.params().clone()).await;
//!     println!("{:?}", render_search(&controller.state(), query.params()));
//!
//!     // Next page skips the debounce
//!     let params = query.set_page(2)?.clone();
//!     controller.update(params).await;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Stale results
//!
//! Controllers never show a response for parameters the user has already
//! moved away from. Superseded requests are cancelled through a
//! [`CancelToken`] and any result that still arrives is dropped.

mod api;
mod cache;
mod cancel;
pub mod chat;
mod client;
mod config;
mod controller;
mod debounce;
mod detail;
mod error;
mod fetch;
mod location;
pub mod params;
mod query_state;
mod response;
pub mod settings;
pub mod types;
pub mod view;

// Re-export the API seam
pub use api::{LocalMovieApi, MovieApi};

// Re-export client types
pub use client::{ClientConfig, DEFAULT_BASE_URL, OmdbClient};

// Re-export error types
pub use error::{ErrorKind, OmdbError, Result, UNEXPECTED_DETAIL_ERROR, UNEXPECTED_SEARCH_ERROR};

// Re-export search state
pub use location::{MemoryLocation, QueryLocation};
pub use params::SearchParams;
pub use query_state::SearchQueryState;

// Re-export fetching
pub use cache::QueryCache;
pub use cancel::CancelToken;
pub use controller::{DEFAULT_MIN_TEXT_LEN, FetchConfig, SearchController};
pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use detail::{DetailConfig, DetailController};
pub use fetch::FetchState;
pub use response::{Envelope, decode_envelope};

// Re-export configuration
pub use config::AppConfig;

// Re-export data types
pub use types::{MovieDetails, MovieSummary, Rating, SearchResult, SearchType};
