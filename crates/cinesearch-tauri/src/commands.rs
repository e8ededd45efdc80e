//! Tauri commands for the movie browser
//!
//! Search mutators answer at once with the new query string and start the
//! fetch in the background; results reach the webview through
//! [`SEARCH_EVENT`](crate::SEARCH_EVENT).

use cinesearch_core::chat::{ChatMessage, PREDEFINED_PROMPTS};
use cinesearch_core::settings::ThemeMode;
use cinesearch_core::view::{DetailView, render_detail};
use cinesearch_core::{SearchParams, SearchType};
use tauri::State;
use tauri::ipc::Channel;
use tracing::warn;

use crate::{MovieState, QueryUpdate, SearchPage, TypeOption, type_options};

/// Start fetching for `params` without blocking the command
fn spawn_update(state: &MovieState, params: SearchParams) {
    let search = state.search.clone();
    tauri::async_runtime::spawn(async move {
        search.update(params).await;
    });
}

/// Restore the search from the page's query string
///
/// Writes the default query back when the string carries no search key.
#[tauri::command]
pub async fn mount_search(
    state: State<'_, MovieState>,
    query: String,
) -> Result<QueryUpdate, String> {
    let update = state.mount(&query).await;
    spawn_update(&state, update.params.clone());
    Ok(update)
}

/// Follow a back/forward navigation or a pasted URL
#[tauri::command]
pub async fn navigate(state: State<'_, MovieState>, query: String) -> Result<QueryUpdate, String> {
    let update = state.navigate(&query).await;
    spawn_update(&state, update.params.clone());
    Ok(update)
}

/// Change the search text (debounced)
#[tauri::command]
pub async fn set_text(state: State<'_, MovieState>, text: String) -> Result<QueryUpdate, String> {
    let update = state.set_text(text).await;
    spawn_update(&state, update.params.clone());
    Ok(update)
}

/// Title kinds for the type selector
#[tauri::command]
pub fn search_types() -> Vec<TypeOption> {
    type_options()
}

/// Change the title kind (debounced)
///
/// # Errors
/// Returns error message as String if `kind` is not movie, series or episode
#[tauri::command]
pub async fn set_type(state: State<'_, MovieState>, kind: String) -> Result<QueryUpdate, String> {
    let kind: SearchType = kind.parse().map_err(|e: cinesearch_core::OmdbError| e.to_string())?;
    let update = state.set_type(kind).await;
    spawn_update(&state, update.params.clone());
    Ok(update)
}

/// Change or clear the year (debounced)
///
/// # Errors
/// Returns error message as String if the year is not four digits
#[tauri::command]
pub async fn set_year(state: State<'_, MovieState>, year: String) -> Result<QueryUpdate, String> {
    let update = state.set_year(&year).await.map_err(|e| e.to_string())?;
    spawn_update(&state, update.params.clone());
    Ok(update)
}

/// Go to another result page (not debounced)
///
/// # Errors
/// Returns error message as String if the page is zero
#[tauri::command]
pub async fn set_page(state: State<'_, MovieState>, page: u32) -> Result<QueryUpdate, String> {
    let update = state.set_page(page).await.map_err(|e| e.to_string())?;
    spawn_update(&state, update.params.clone());
    Ok(update)
}

/// Submit the form: refetch the current parameters, bypassing the cache
#[tauri::command]
pub async fn submit_search(state: State<'_, MovieState>) -> Result<SearchPage, String> {
    let params = state.query.lock().await.params().clone();
    state.search.submit(params).await;
    Ok(state.search_page().await)
}

/// Current search page, rendered
#[tauri::command]
pub async fn search_view(state: State<'_, MovieState>) -> Result<SearchPage, String> {
    Ok(state.search_page().await)
}

/// Load a title's detail page
///
/// Resolves once the lookup settles; the view reflects whichever id is
/// selected at that point.
#[tauri::command]
pub async fn movie_details(state: State<'_, MovieState>, id: String) -> Result<DetailView, String> {
    state.details.select(&id).await;
    Ok(render_detail(&state.details.state()))
}

/// Conversation starters
#[tauri::command]
pub fn chat_prompts() -> Vec<String> {
    PREDEFINED_PROMPTS.iter().map(|p| (*p).to_string()).collect()
}

/// Visible chat history for a movie
#[tauri::command]
pub async fn chat_history(
    state: State<'_, MovieState>,
    movie_id: String,
) -> Result<Vec<ChatMessage>, String> {
    Ok(state.chat_history(&movie_id).await)
}

/// Ask about a movie, streaming the reply over `on_chunk`
///
/// # Errors
/// Returns "Failed to send message. Please try again." on any failure
#[tauri::command]
pub async fn chat_send(
    state: State<'_, MovieState>,
    movie_id: String,
    prompt: String,
    on_chunk: Channel<String>,
) -> Result<String, String> {
    state
        .send_chat(&movie_id, &prompt, move |chunk| {
            if let Err(e) = on_chunk.send(chunk.to_string()) {
                warn!(error = %e, "failed to forward chat chunk");
            }
        })
        .await
}

/// Saved theme mode
#[tauri::command]
pub async fn get_theme(state: State<'_, MovieState>) -> Result<ThemeMode, String> {
    Ok(state.settings.lock().await.theme())
}

/// Switch between light and dark, saving the choice
///
/// # Errors
/// Returns error message as String if the settings file cannot be written
#[tauri::command]
pub async fn toggle_theme(state: State<'_, MovieState>) -> Result<ThemeMode, String> {
    state
        .settings
        .lock()
        .await
        .toggle_theme()
        .map_err(|e| e.to_string())
}
