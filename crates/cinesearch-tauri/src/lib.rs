//! Cinesearch Tauri Integration
//!
//! Provides a Tauri plugin that drives the movie search from a webview.
//!
//! # Usage
//!
//! Register the plugin in your Tauri application:
//!
//! ```ignore
//! fn main() {
//!     tauri::Builder::default()
//!         .plugin(cinesearch_tauri::init())
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
//!
//! Then invoke commands from the frontend:
//!
//! ```javascript
//! import { invoke, Channel } from '@tauri-apps/api/core';
//! import { listen } from '@tauri-apps/api/event';
//!
//! // Restore the search from the page URL
//! const { query } = await invoke('plugin:cinesearch|mount_search', { query: location.search });
//! history.replaceState(null, '', `?${query}`);
//!
//! // Results arrive as events
//! await listen('cinesearch://search', (event) => render(event.payload));
//! await invoke('plugin:cinesearch|set_text', { text: 'batman' });
//!
//! // Stream a chat reply
//! const onChunk = new Channel();
//! onChunk.onmessage = (chunk) => append(chunk);
//! await invoke('plugin:cinesearch|chat_send', { movieId: 'tt0372784', prompt: 'Analyze the ending', onChunk });
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use cinesearch_core::chat::{ChatClient, ChatMessage, ChatSession};
use cinesearch_core::settings::{JsonFilePersistence, SettingsStore};
use cinesearch_core::view::{SearchView, render_search, search_summary};
use cinesearch_core::{
    AppConfig, DetailController, MemoryLocation, OmdbClient, OmdbError, QueryLocation,
    SearchController, SearchParams, SearchQueryState, SearchType, UNEXPECTED_DETAIL_ERROR,
};
use serde::Serialize;
use tauri::{
    Emitter, Manager, Runtime,
    plugin::{Builder, TauriPlugin},
};
use tracing::{debug, info, warn};

mod commands;

/// Event carrying the rendered search view after every state change
pub const SEARCH_EVENT: &str = "cinesearch://search";

/// File name of the persisted settings inside the app config directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Search parameters after a change, plus the query string for the address bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryUpdate {
    pub params: SearchParams,
    pub query: String,
}

/// Everything the search page needs to draw itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchPage {
    pub params: SearchParams,
    pub query: String,
    pub summary: String,
    pub view: SearchView,
}

/// One entry of the title kind selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeOption {
    pub value: SearchType,
    pub label: &'static str,
}

/// Selector entries for every title kind, in display order
pub fn type_options() -> Vec<TypeOption> {
    SearchType::ALL
        .into_iter()
        .map(|kind| TypeOption {
            value: kind,
            label: kind.label(),
        })
        .collect()
}

/// Chat session for one movie, created on the first message
type ChatSlot = Arc<Mutex<Option<ChatSession>>>;

/// Shared state behind the plugin commands
///
/// Controllers are cheap handles over shared state; the query state and the
/// settings store sit behind async mutexes since commands run concurrently.
/// Each movie's chat has its own lock, held for a whole exchange, so sends
/// for one movie run in order.
pub struct MovieState {
    pub(crate) search: SearchController<OmdbClient>,
    pub(crate) details: DetailController<OmdbClient>,
    pub(crate) query: Arc<Mutex<SearchQueryState<MemoryLocation>>>,
    pub(crate) chat: ChatClient,
    pub(crate) chats: Mutex<HashMap<String, ChatSlot>>,
    pub(crate) settings: Mutex<SettingsStore<JsonFilePersistence>>,
}

impl MovieState {
    /// Create the state from configuration
    ///
    /// # Errors
    /// Returns error string if an HTTP client cannot be built
    pub fn new(config: AppConfig, settings_path: impl Into<PathBuf>) -> Result<Self, String> {
        let omdb = OmdbClient::with_config(config.omdb).map_err(|e| e.to_string())?;
        let chat = ChatClient::new(config.chat).map_err(|e| e.to_string())?;

        Ok(Self {
            search: SearchController::with_config(omdb.clone(), config.search),
            details: DetailController::with_config(omdb, config.detail),
            query: Arc::new(Mutex::new(SearchQueryState::mount(
                MemoryLocation::default(),
                SearchParams::default(),
            ))),
            chat,
            chats: Mutex::new(HashMap::new()),
            settings: Mutex::new(SettingsStore::new(JsonFilePersistence::new(
                settings_path,
            ))),
        })
    }

    /// Bind the search to the page's query string
    pub async fn mount(&self, query: &str) -> QueryUpdate {
        let mut state = self.query.lock().await;
        *state = SearchQueryState::mount(MemoryLocation::new(query), SearchParams::default());
        update_of(&state)
    }

    /// The address bar changed outside the plugin (back/forward or a pasted URL)
    pub async fn navigate(&self, query: &str) -> QueryUpdate {
        let mut state = self.query.lock().await;
        state.location_mut().replace_query(query.trim_start_matches('?').to_string());
        state.sync_from_location();
        update_of(&state)
    }

    /// Change the search text
    pub async fn set_text(&self, text: String) -> QueryUpdate {
        let mut state = self.query.lock().await;
        state.set_text(text);
        update_of(&state)
    }

    /// Change the title kind; moving into or out of episodes clears the text
    pub async fn set_type(&self, kind: SearchType) -> QueryUpdate {
        let mut state = self.query.lock().await;
        let current = state.params().clone();
        if current.kind.switch_clears_text(kind) {
            state.replace(SearchParams {
                text: String::new(),
                kind,
                ..current
            });
        } else {
            state.set_kind(kind);
        }
        update_of(&state)
    }

    /// Change or clear the year
    ///
    /// # Errors
    /// `Validation` if the year is not four digits
    pub async fn set_year(&self, year: &str) -> Result<QueryUpdate, OmdbError> {
        let mut state = self.query.lock().await;
        state.set_year(year)?;
        Ok(update_of(&state))
    }

    /// Change the page
    ///
    /// # Errors
    /// `Validation` if the page is zero
    pub async fn set_page(&self, page: u32) -> Result<QueryUpdate, OmdbError> {
        let mut state = self.query.lock().await;
        state.set_page(page)?;
        Ok(update_of(&state))
    }

    /// Current search page
    pub async fn search_page(&self) -> SearchPage {
        let state = self.query.lock().await;
        page_of(&state, &self.search)
    }

    /// Visible chat history for a movie
    pub async fn chat_history(&self, movie_id: &str) -> Vec<ChatMessage> {
        let Some(slot) = self.chats.lock().await.get(movie_id).cloned() else {
            return Vec::new();
        };
        let session = slot.lock().await;
        session
            .as_ref()
            .map(|session| session.visible_messages().cloned().collect())
            .unwrap_or_default()
    }

    /// Ask about a movie, passing reply text to `on_chunk` as it streams
    ///
    /// The first message loads the movie's details to build the session.
    ///
    /// # Errors
    /// Returns the user-facing message if the details or the reply fail
    pub async fn send_chat<F>(
        &self,
        movie_id: &str,
        prompt: &str,
        on_chunk: F,
    ) -> Result<String, String>
    where
        F: FnMut(&str) + Send,
    {
        let slot = {
            let mut chats = self.chats.lock().await;
            Arc::clone(chats.entry(movie_id.to_string()).or_default())
        };
        let mut guard = slot.lock().await;

        let session = match guard.take() {
            Some(session) => session,
            None => {
                let movie = self.details.fetch(movie_id).await.map_err(|e| {
                    warn!(error = %e, "cannot start chat without movie details");
                    e.user_message(UNEXPECTED_DETAIL_ERROR)
                })?;
                ChatSession::for_movie(&movie)
            }
        };
        let session = guard.insert(session);

        self.chat
            .send(session, prompt, on_chunk)
            .await
            .map_err(|e| e.user_message().to_string())
    }
}

fn update_of(state: &SearchQueryState<MemoryLocation>) -> QueryUpdate {
    QueryUpdate {
        params: state.params().clone(),
        query: state.location().query(),
    }
}

fn page_of(
    state: &SearchQueryState<MemoryLocation>,
    search: &SearchController<OmdbClient>,
) -> SearchPage {
    let fetch = search.state();
    let params = state.params().clone();
    let total = fetch.data().map_or(0, |result| result.total_count);
    SearchPage {
        summary: search_summary(&params, total),
        view: render_search(&fetch, &params),
        query: state.location().query(),
        params,
    }
}

/// Forward every search state change to the webview as a rendered page
fn watch_search<R: Runtime>(app: tauri::AppHandle<R>, state: &MovieState) {
    let search = state.search.clone();
    let query = Arc::clone(&state.query);
    let mut changes = search.subscribe();

    tauri::async_runtime::spawn(async move {
        while changes.changed().await.is_ok() {
            let page = {
                let state = query.lock().await;
                page_of(&state, &search)
            };
            if let Err(e) = app.emit(SEARCH_EVENT, &page) {
                warn!(error = %e, "failed to emit search page");
            }
        }
        debug!("search state channel closed");
    });
}

/// Initialize the cinesearch plugin
///
/// Reads `OMDB_API_KEY`, `OMDB_BASE_URL` and `AI_API_URL` from the
/// environment and keeps settings in the app config directory.
///
/// # Example
/// ```ignore
/// tauri::Builder::default()
///     .plugin(cinesearch_tauri::init())
///     .run(tauri::generate_context!())
///     .expect("error while running tauri application");
/// ```
pub fn init<R: Runtime>() -> TauriPlugin<R> {
    Builder::new("cinesearch")
        .invoke_handler(tauri::generate_handler![
            commands::mount_search,
            commands::navigate,
            commands::set_text,
            commands::search_types,
            commands::set_type,
            commands::set_year,
            commands::set_page,
            commands::submit_search,
            commands::search_view,
            commands::movie_details,
            commands::chat_prompts,
            commands::chat_history,
            commands::chat_send,
            commands::get_theme,
            commands::toggle_theme
        ])
        .setup(|app, _api| {
            let settings_path = app.path().app_config_dir()?.join(SETTINGS_FILE);
            let state = MovieState::new(AppConfig::from_env(), settings_path)
                .map_err(Box::<dyn std::error::Error>::from)?;
            watch_search(app.clone(), &state);
            app.manage(state);
            info!("cinesearch plugin ready");
            Ok(())
        })
        .build()
}

// Re-export types for convenience
pub use cinesearch_core::{MovieDetails as Movie, MovieSummary as MovieCard};
