//! HTTP client for the OMDb API
//!
//! Performs exactly two request shapes (search and lookup by id), validates
//! input before touching the network, and normalizes every answer through
//! the response envelope. Retry policy belongs to the caller.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::api::MovieApi;
use crate::cancel::CancelToken;
use crate::error::{OmdbError, Result};
use crate::params::{SearchParams, validate_page};
use crate::response::{RawDetails, RawSearch, decode_payload};
use crate::types::{MovieDetails, SearchResult};

/// Default OMDb endpoint
pub const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";

const USER_AGENT: &str = concat!("cinesearch/", env!("CARGO_PKG_VERSION"));

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint every request is sent to (default: [`DEFAULT_BASE_URL`])
    pub base_url: String,
    /// OMDb API key sent as `apikey`
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

/// OMDb HTTP client
///
/// Handles all HTTP communication with the movie service:
/// - Input validation before any request is built
/// - Cooperative cancellation of in-flight requests
/// - Decoding of the `Response`-tagged envelope into typed results
#[derive(Debug, Clone)]
pub struct OmdbClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    /// Create a new client with default configuration
    ///
    /// # Errors
    /// - `HttpError` if the HTTP client cannot be built
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig {
            api_key: api_key.into(),
            ..ClientConfig::default()
        })
    }

    /// Create a new client with custom configuration
    ///
    /// # Errors
    /// - `HttpError` if the HTTP client cannot be built
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(OmdbError::HttpError)?;

        Ok(Self {
            client,
            base_url: config.base_url,
            api_key: config.api_key,
        })
    }

    /// Send one GET with the API key and `query`, then decode the envelope
    async fn get<T: DeserializeOwned>(
        &self,
        query: &[(&str, String)],
        cancel: &CancelToken,
    ) -> Result<T> {
        if cancel.is_cancelled() {
            return Err(OmdbError::Cancelled);
        }

        let request = self
            .client
            .get(&self.base_url)
            .query(&[("apikey", self.api_key.as_str())])
            .query(query);

        let body = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("request cancelled");
                return Err(OmdbError::Cancelled);
            }
            body = Self::send(request) => body?,
        };

        decode_payload(&body)
    }

    async fn send(request: reqwest::RequestBuilder) -> Result<String> {
        let response = request.send().await.map_err(OmdbError::HttpError)?;
        let status = response.status();

        if !status.is_success() {
            warn!(status = status.as_u16(), "OMDb answered with an error status");
            return Err(OmdbError::Status(status.as_u16()));
        }

        response.text().await.map_err(OmdbError::HttpError)
    }
}

impl MovieApi for OmdbClient {
    /// Search titles
    ///
    /// # Errors
    /// - `Validation` if the text is blank or the page is zero
    /// - `Domain` if the service reports a failure (e.g., "Movie not found!")
    /// - `HttpError` / `Status` / `Decode` for transport failures
    /// - `Cancelled` if `cancel` fires first
    #[instrument(skip(self, cancel), fields(text = %params.text, page = params.page))]
    async fn search(&self, params: &SearchParams, cancel: &CancelToken) -> Result<SearchResult> {
        if params.text.trim().is_empty() {
            return Err(OmdbError::Validation(
                "search text cannot be empty".to_string(),
            ));
        }
        validate_page(params.page)?;

        let mut query: Vec<(&str, String)> = vec![
            ("s", params.text.trim().to_string()),
            ("type", params.kind.as_str().to_string()),
            ("page", params.page.to_string()),
        ];
        if let Some(year) = &params.year {
            query.push(("y", year.clone()));
        }

        debug!("OMDb search request");
        let raw: RawSearch = self.get(&query, cancel).await?;
        raw.into_result(params.clone())
    }

    /// Fetch full details for one title
    ///
    /// # Errors
    /// - `Validation` if `id` is blank
    /// - `Domain` if the service reports a failure (e.g., "Incorrect IMDb ID.")
    /// - `HttpError` / `Status` / `Decode` for transport failures
    /// - `Cancelled` if `cancel` fires first
    #[instrument(skip(self, cancel))]
    async fn movie_by_id(&self, id: &str, cancel: &CancelToken) -> Result<MovieDetails> {
        let id = id.trim();
        if id.is_empty() {
            return Err(OmdbError::Validation("movie id cannot be empty".to_string()));
        }

        let query = [("i", id.to_string()), ("plot", "full".to_string())];

        debug!("OMDb detail request");
        let raw: RawDetails = self.get(&query, cancel).await?;
        Ok(MovieDetails::from(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchType;
    use wiremock::matchers::{method, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OmdbClient {
        OmdbClient::with_config(ClientConfig {
            base_url: format!("{}/", server.uri()),
            api_key: "test-key".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_client_creation() {
        assert!(OmdbClient::new("key").is_ok());
    }

    #[tokio::test]
    async fn test_search_via_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("apikey", "test-key"))
            .and(query_param("s", "heat"))
            .and(query_param("type", "movie"))
            .and(query_param("y", "1995"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"Search":[{"Title":"Heat","Year":"1995","imdbID":"tt0113277","Type":"movie","Poster":"N/A"}],"totalResults":"11","Response":"True"}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let params = SearchParams::new("heat", SearchType::Movie)
            .with_year("1995")
            .unwrap()
            .with_page(2)
            .unwrap();
        let result = client_for(&server)
            .search(&params, &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].title, "Heat");
        assert_eq!(result.total_count, 11);
        assert_eq!(result.source_params, params);
    }

    #[tokio::test]
    async fn test_search_omits_missing_year() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param_is_missing("y"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"Search":[],"totalResults":"0","Response":"True"}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let params = SearchParams::new("heat", SearchType::Series);
        let result = client_for(&server)
            .search(&params, &CancelToken::new())
            .await
            .unwrap();
        assert!(result.items.is_empty());
    }

    #[tokio::test]
    async fn test_movie_by_id_via_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("i", "tt1234567"))
            .and(query_param("plot", "full"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"Title":"Test Movie","Year":"2024","imdbID":"tt1234567","Plot":"Test plot","Response":"True"}"#,
            ))
            .mount(&server)
            .await;

        let details = client_for(&server)
            .movie_by_id("tt1234567", &CancelToken::new())
            .await
            .unwrap();
        assert_eq!(details.title, "Test Movie");
        assert_eq!(details.plot, "Test plot");
    }

    #[tokio::test]
    async fn test_movie_by_id_domain_error_is_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"Response":"False","Error":"Movie not found!"}"#,
            ))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .movie_by_id("tt0000000", &CancelToken::new())
            .await
            .unwrap_err();
        match err {
            OmdbError::Domain(message) => assert_eq!(message, "Movie not found!"),
            other => panic!("Expected Domain error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .search(&SearchParams::new("heat", SearchType::Movie), &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, OmdbError::Status(503)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_validation_happens_before_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let client = client_for(&server);
        let cancel = CancelToken::new();

        let mut params = SearchParams::new("heat", SearchType::Movie);
        params.page = 0;
        assert!(matches!(
            client.search(&params, &cancel).await,
            Err(OmdbError::Validation(_))
        ));
        assert!(matches!(
            client.search(&SearchParams::new("  ", SearchType::Movie), &cancel).await,
            Err(OmdbError::Validation(_))
        ));
        assert!(matches!(
            client.movie_by_id("   ", &cancel).await,
            Err(OmdbError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_aborts_slow_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"Search":[],"totalResults":"0","Response":"True"}"#)
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let cancel = CancelToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let err = client
            .search(&SearchParams::new("heat", SearchType::Movie), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, OmdbError::Cancelled));
    }

    #[tokio::test]
    async fn test_already_cancelled_token_skips_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let cancel = CancelToken::new();
        cancel.cancel();
        let err = client_for(&server)
            .movie_by_id("tt0133093", &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, OmdbError::Cancelled));
    }
}
