//! Detail lookup by id
//!
//! Same cache and last-key-wins discipline as the search controller, keyed
//! by id only. Transient transport failures are retried a few times with
//! exponential backoff; domain and validation errors surface at once.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tracing::{debug, instrument, warn};

use crate::api::MovieApi;
use crate::cache::QueryCache;
use crate::cancel::CancelToken;
use crate::error::{OmdbError, Result, UNEXPECTED_DETAIL_ERROR};
use crate::fetch::FetchState;
use crate::types::MovieDetails;

/// Retry policy for detail lookups
#[derive(Debug, Clone)]
pub struct DetailConfig {
    /// Extra attempts after the first failure (default: 3)
    pub retries: u32,
    /// Backoff before the first retry, doubled each time (default: 1s)
    pub retry_delay: Duration,
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Default)]
struct ActiveId {
    id: Option<String>,
    cancel: CancelToken,
}

#[derive(Debug)]
struct Inner<A> {
    api: A,
    config: DetailConfig,
    cache: QueryCache<String, MovieDetails>,
    active: Mutex<ActiveId>,
    state: watch::Sender<FetchState<MovieDetails>>,
}

/// Detail fetch controller
#[derive(Debug)]
pub struct DetailController<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for DetailController<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: MovieApi + Sync> DetailController<A> {
    /// Create a controller with the default retry policy
    pub fn new(api: A) -> Self {
        Self::with_config(api, DetailConfig::default())
    }

    /// Create a controller with a custom retry policy
    pub fn with_config(api: A, config: DetailConfig) -> Self {
        let (state, _) = watch::channel(FetchState::Idle);
        Self {
            inner: Arc::new(Inner {
                api,
                config,
                cache: QueryCache::new(),
                active: Mutex::new(ActiveId::default()),
                state,
            }),
        }
    }

    /// Current fetch state
    pub fn state(&self) -> FetchState<MovieDetails> {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to fetch state changes
    pub fn subscribe(&self) -> watch::Receiver<FetchState<MovieDetails>> {
        self.inner.state.subscribe()
    }

    /// Show the title with this id
    ///
    /// A blank id clears the state without a request. Selecting another id
    /// before this one resolves cancels it and discards its result.
    #[instrument(skip(self))]
    pub async fn select(&self, id: &str) {
        let id = id.trim().to_string();
        let cancel = {
            let mut active = self.inner.active.lock().await;
            // Re-selecting the active id joins its request instead of restarting it.
            if active.id.as_deref() != Some(id.as_str()) {
                active.cancel.cancel();
                active.cancel = CancelToken::new();
                active.id = Some(id.clone());
            }
            active.cancel.clone()
        };

        if id.is_empty() {
            self.commit(&id, FetchState::Idle).await;
            return;
        }

        if let Some(data) = self.inner.cache.get(&id).await {
            self.commit(&id, FetchState::Success { data }).await;
            return;
        }

        self.commit(&id, FetchState::Loading).await;
        let state = match self.load(&id, &cancel).await {
            Ok(data) => FetchState::Success { data },
            Err(OmdbError::Cancelled) => {
                debug!("detail request superseded");
                return;
            }
            Err(e) => FetchState::from_error(&e, UNEXPECTED_DETAIL_ERROR),
        };
        self.commit(&id, state).await;
    }

    /// Fetch details through the cache without touching the visible state
    ///
    /// # Errors
    /// Validation, domain or transport errors after retries are exhausted.
    pub async fn fetch(&self, id: &str) -> Result<MovieDetails> {
        self.load(id.trim(), &CancelToken::new()).await
    }

    /// Drop the cached details for one id
    pub async fn invalidate(&self, id: &str) -> bool {
        self.inner.cache.invalidate(&id.trim().to_string()).await
    }

    async fn load(&self, id: &str, cancel: &CancelToken) -> Result<MovieDetails> {
        let key = id.to_string();
        self.inner
            .cache
            .get_or_fetch(&key, || self.fetch_with_retry(id, cancel))
            .await
    }

    async fn fetch_with_retry(&self, id: &str, cancel: &CancelToken) -> Result<MovieDetails> {
        let config = &self.inner.config;
        let mut attempt: u32 = 0;

        loop {
            match self.inner.api.movie_by_id(id, cancel).await {
                Ok(details) => return Ok(details),
                Err(e) if e.is_retryable() && attempt < config.retries => {
                    // Exponential backoff: delay, 2x delay, 4x delay, ...
                    let backoff = config.retry_delay.saturating_mul(2u32.saturating_pow(attempt));
                    attempt += 1;
                    warn!(
                        attempt,
                        max_retries = config.retries,
                        error = %e,
                        "detail lookup failed. Retrying..."
                    );
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(OmdbError::Cancelled),
                        () = tokio::time::sleep(backoff) => {}
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn commit(&self, id: &str, state: FetchState<MovieDetails>) -> bool {
        let active = self.inner.active.lock().await;
        if active.id.as_deref() != Some(id) {
            debug!(id, "discarding detail result for stale id");
            return false;
        }
        self.inner.state.send_replace(state);
        true
    }
}
