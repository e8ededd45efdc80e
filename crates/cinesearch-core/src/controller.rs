//! Debounced search fetch controller
//!
//! Decides when a search request is issued and which result becomes
//! visible. Edits to text, type or year are debounced; page changes fetch
//! at once. Results are cached per [`SearchParams`] key and identical
//! in-flight keys share one request. Whatever order responses arrive in,
//! only a result for the currently active key is committed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tracing::{debug, instrument};

use crate::api::MovieApi;
use crate::cache::QueryCache;
use crate::cancel::CancelToken;
use crate::debounce::{DEFAULT_DEBOUNCE, Debouncer};
use crate::error::{OmdbError, Result, UNEXPECTED_SEARCH_ERROR};
use crate::fetch::FetchState;
use crate::params::SearchParams;
use crate::types::SearchResult;

/// Default minimum number of characters before a search is issued
pub const DEFAULT_MIN_TEXT_LEN: usize = 2;

/// Tuning for the search controller
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Quiet period required after a text/type/year edit (default: 300ms)
    pub debounce: Duration,
    /// Minimum trimmed text length that triggers a request (default: 2)
    pub min_text_len: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            min_text_len: DEFAULT_MIN_TEXT_LEN,
        }
    }
}

#[derive(Debug, Default)]
struct ActiveKey {
    /// Key whose result may be committed
    params: Option<SearchParams>,
    /// Last key that made it past the debounce
    settled: Option<SearchParams>,
    /// Cancels the request for `params`
    cancel: CancelToken,
}

#[derive(Debug)]
struct Inner<A> {
    api: A,
    config: FetchConfig,
    cache: QueryCache<SearchParams, SearchResult>,
    debouncer: Debouncer,
    active: Mutex<ActiveKey>,
    state: watch::Sender<FetchState<SearchResult>>,
}

/// Search fetch controller
///
/// Cheap to clone; clones share cache and state.
#[derive(Debug)]
pub struct SearchController<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for SearchController<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: MovieApi + Sync> SearchController<A> {
    /// Create a controller with default tuning
    pub fn new(api: A) -> Self {
        Self::with_config(api, FetchConfig::default())
    }

    /// Create a controller with custom tuning
    pub fn with_config(api: A, config: FetchConfig) -> Self {
        let (state, _) = watch::channel(FetchState::Idle);
        Self {
            inner: Arc::new(Inner {
                api,
                debouncer: Debouncer::new(config.debounce),
                config,
                cache: QueryCache::new(),
                active: Mutex::new(ActiveKey::default()),
                state,
            }),
        }
    }

    /// Current fetch state
    pub fn state(&self) -> FetchState<SearchResult> {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to fetch state changes
    pub fn subscribe(&self) -> watch::Receiver<FetchState<SearchResult>> {
        self.inner.state.subscribe()
    }

    /// React to new search parameters
    ///
    /// Resolves once `params` has been committed, found to be below the
    /// activation threshold, or superseded by a later call. Re-sending the
    /// active key is a no-op; use [`submit`](Self::submit) to refetch.
    #[instrument(skip_all, fields(text = %params.text, page = params.page))]
    pub async fn update(&self, params: SearchParams) {
        let params = params.normalized();
        let Some((cancel, page_only)) = self.activate(&params, false).await else {
            return;
        };

        if page_only {
            self.inner.debouncer.cancel_pending();
        } else if !self.inner.debouncer.settle().await {
            debug!("superseded during debounce");
            return;
        }

        self.run(params, cancel).await;
    }

    /// Explicit re-submit: drop the cached entry and fetch without debounce
    ///
    /// The only retry path for a failed search.
    #[instrument(skip_all, fields(text = %params.text, page = params.page))]
    pub async fn submit(&self, params: SearchParams) {
        let params = params.normalized();
        self.inner.cache.invalidate(&params).await;
        if let Some((cancel, _)) = self.activate(&params, true).await {
            self.inner.debouncer.cancel_pending();
            self.run(params, cancel).await;
        }
    }

    /// Fetch through the cache without touching the visible state
    ///
    /// # Errors
    /// Validation, domain or transport errors from the API.
    pub async fn fetch(&self, params: &SearchParams) -> Result<SearchResult> {
        let params = params.clone().normalized();
        let cancel = CancelToken::new();
        let api = &self.inner.api;
        self.inner
            .cache
            .get_or_fetch(&params, || api.search(&params, &cancel))
            .await
    }

    /// Drop the cached entry for one key
    pub async fn invalidate(&self, params: &SearchParams) -> bool {
        self.inner.cache.invalidate(&params.clone().normalized()).await
    }

    /// Drop every cached entry
    pub async fn clear_cache(&self) {
        self.inner.cache.clear().await;
    }

    /// Number of cached result pages
    pub async fn cached_pages(&self) -> usize {
        self.inner.cache.len().await
    }

    /// Make `params` the active key, cancelling the previous request
    ///
    /// Returns the new cancel token and whether only the page changed since
    /// the last settled key, or `None` if `params` is already active and
    /// `force` is false.
    async fn activate(&self, params: &SearchParams, force: bool) -> Option<(CancelToken, bool)> {
        let mut active = self.inner.active.lock().await;
        if !force && active.params.as_ref() == Some(params) {
            return None;
        }

        active.cancel.cancel();
        active.cancel = CancelToken::new();
        active.params = Some(params.clone());

        let page_only = active
            .settled
            .as_ref()
            .is_some_and(|settled| settled.same_filter(params));
        Some((active.cancel.clone(), page_only))
    }

    async fn run(&self, params: SearchParams, cancel: CancelToken) {
        {
            let mut active = self.inner.active.lock().await;
            if active.params.as_ref() != Some(&params) {
                return;
            }
            active.settled = Some(params.clone());
        }

        if params.text.trim().chars().count() < self.inner.config.min_text_len {
            debug!("text below minimum length; not searching");
            self.commit(&params, FetchState::Idle).await;
            return;
        }

        if let Some(data) = self.inner.cache.get(&params).await {
            debug!("serving search from cache");
            self.commit(&params, FetchState::Success { data }).await;
            return;
        }

        self.commit(&params, FetchState::Loading).await;

        let api = &self.inner.api;
        let result = self
            .inner
            .cache
            .get_or_fetch(&params, || api.search(&params, &cancel))
            .await;

        let state = match result {
            Ok(data) => FetchState::Success { data },
            Err(OmdbError::Cancelled) => {
                debug!("request cancelled; key superseded");
                return;
            }
            Err(e) => {
                debug!(error = %e, "search failed");
                FetchState::from_error(&e, UNEXPECTED_SEARCH_ERROR)
            }
        };
        self.commit(&params, state).await;
    }

    /// Publish `state` if `params` is still the active key
    async fn commit(&self, params: &SearchParams, state: FetchState<SearchResult>) -> bool {
        let active = self.inner.active.lock().await;
        if active.params.as_ref() != Some(params) {
            debug!("discarding result for stale key");
            return false;
        }
        self.inner.state.send_replace(state);
        true
    }
}
