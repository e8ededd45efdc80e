//! Result presentation
//!
//! Pure mapping from fetch state and parameters to what the page shows.
//! Exactly one view is produced for any input.

use serde::Serialize;

use crate::fetch::FetchState;
use crate::params::SearchParams;
use crate::types::{MovieDetails, MovieSummary, PAGE_SIZE, SearchResult, page_count};

/// Which empty state to show
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EmptyState {
    /// No search performed yet
    Initial,
    /// A search ran and matched nothing
    NoResults { term: String },
}

impl EmptyState {
    /// Heading line
    pub fn title(&self) -> String {
        match self {
            Self::Initial => "Start Your Movie Search".to_string(),
            Self::NoResults { term } => format!("No results found for \"{term}\""),
        }
    }

    /// Hint below the heading
    pub fn subtitle(&self) -> &'static str {
        match self {
            Self::Initial => "Enter a movie title in the search box above to begin exploring",
            Self::NoResults { .. } => "Try adjusting your search terms or filters",
        }
    }
}

/// Pagination control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Selected 1-based page
    pub current: u32,
    /// Number of pages
    pub total_pages: u32,
}

impl Pagination {
    /// Control for `total` matches, or `None` when one page holds them all
    pub fn for_total(total: u32, current: u32) -> Option<Self> {
        let total_pages = page_count(total, PAGE_SIZE);
        (total_pages > 1).then_some(Self {
            current,
            total_pages,
        })
    }
}

/// What the search page shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "kebab-case")]
pub enum SearchView {
    /// Spinner
    Loading,
    /// Inline error message
    Error { message: String },
    /// Initial or no-results message
    Empty { state: EmptyState },
    /// Grid of results
    Results {
        items: Vec<MovieSummary>,
        pagination: Option<Pagination>,
    },
}

/// Map search state and parameters to a view
pub fn render_search(state: &FetchState<SearchResult>, params: &SearchParams) -> SearchView {
    match state {
        FetchState::Loading => SearchView::Loading,
        _ if !params.is_active() => SearchView::Empty {
            state: EmptyState::Initial,
        },
        FetchState::Idle => SearchView::Empty {
            state: EmptyState::Initial,
        },
        FetchState::Error { message, .. } => SearchView::Error {
            message: message.clone(),
        },
        FetchState::Success { data } if data.items.is_empty() => SearchView::Empty {
            state: EmptyState::NoResults {
                term: data.source_params.text.clone(),
            },
        },
        FetchState::Success { data } => SearchView::Results {
            items: data.items.clone(),
            pagination: Pagination::for_total(data.total_count, data.source_params.page),
        },
    }
}

/// Page description for the current search
///
/// # Example
/// ```
/// use cinesearch_core::{SearchParams, SearchType, view::search_summary};
/// let params = SearchParams::new("heat", SearchType::Movie).with_year("1995").unwrap();
/// assert_eq!(
///     search_summary(&params, 3),
///     "Search results for \"heat\" (1995) - 3 movies found"
/// );
/// ```
pub fn search_summary(params: &SearchParams, total: u32) -> String {
    if !params.is_active() {
        return "Search movies, TV shows, and episodes from OMDB database".to_string();
    }
    let year = params
        .year
        .as_ref()
        .map(|y| format!(" ({y})"))
        .unwrap_or_default();
    format!(
        "Search results for \"{}\"{year} - {total} movies found",
        params.text
    )
}

/// What the detail page shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "kebab-case")]
pub enum DetailView {
    /// Nothing selected
    Empty,
    /// Spinner
    Loading,
    /// Inline error message
    Error { message: String },
    /// The title's details
    Details { movie: Box<MovieDetails> },
}

/// Map detail state to a view
pub fn render_detail(state: &FetchState<MovieDetails>) -> DetailView {
    match state {
        FetchState::Idle => DetailView::Empty,
        FetchState::Loading => DetailView::Loading,
        FetchState::Error { message, .. } => DetailView::Error {
            message: message.clone(),
        },
        FetchState::Success { data } => DetailView::Details {
            movie: Box::new(data.clone()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::SearchType;

    fn result(text: &str, count: usize, total: u32) -> SearchResult {
        let params = SearchParams::new(text, SearchType::Movie);
        SearchResult {
            items: (0..count)
                .map(|i| MovieSummary {
                    id: format!("tt{i}"),
                    title: format!("{text} {i}"),
                    year: "2001".to_string(),
                    kind: SearchType::Movie,
                    poster_url: "N/A".to_string(),
                })
                .collect(),
            total_count: total,
            source_params: params,
        }
    }

    #[test]
    fn test_initial_state_when_no_text() {
        let params = SearchParams::default();
        let view = render_search(&FetchState::Idle, &params);
        assert_eq!(view, SearchView::Empty { state: EmptyState::Initial });

        let stale = FetchState::Success { data: result("heat", 3, 3) };
        assert_eq!(
            render_search(&stale, &params),
            SearchView::Empty { state: EmptyState::Initial }
        );
    }

    #[test]
    fn test_loading_view() {
        let params = SearchParams::new("heat", SearchType::Movie);
        assert_eq!(render_search(&FetchState::Loading, &params), SearchView::Loading);
    }

    #[test]
    fn test_no_results_interpolates_term() {
        let params = SearchParams::new("qwxz", SearchType::Movie);
        let view = render_search(&FetchState::Success { data: result("qwxz", 0, 0) }, &params);
        let SearchView::Empty { state } = view else {
            panic!("Expected empty view");
        };
        assert_eq!(state.title(), "No results found for \"qwxz\"");
        assert_eq!(state.subtitle(), "Try adjusting your search terms or filters");
    }

    #[test]
    fn test_no_results_names_searched_term_while_typing() {
        let typing = SearchParams::new("qwxzy", SearchType::Movie);
        let view = render_search(&FetchState::Success { data: result("qwxz", 0, 0) }, &typing);
        assert_eq!(
            view,
            SearchView::Empty {
                state: EmptyState::NoResults {
                    term: "qwxz".to_string()
                }
            }
        );
    }

    #[test]
    fn test_error_view_shows_message() {
        let params = SearchParams::new("heat", SearchType::Movie);
        let state = FetchState::Error {
            kind: ErrorKind::Domain,
            message: "Too many results.".to_string(),
        };
        assert_eq!(
            render_search(&state, &params),
            SearchView::Error { message: "Too many results.".to_string() }
        );
    }

    #[test]
    fn test_pagination_for_25_results_has_3_pages() {
        let params = SearchParams::new("heat", SearchType::Movie);
        let view = render_search(&FetchState::Success { data: result("heat", 10, 25) }, &params);
        let SearchView::Results { items, pagination } = view else {
            panic!("Expected results view");
        };
        assert_eq!(items.len(), 10);
        assert_eq!(pagination, Some(Pagination { current: 1, total_pages: 3 }));
    }

    #[test]
    fn test_pagination_hidden_for_single_page() {
        let params = SearchParams::new("heat", SearchType::Movie);
        let view = render_search(&FetchState::Success { data: result("heat", 10, 10) }, &params);
        assert!(matches!(view, SearchView::Results { pagination: None, .. }));
    }

    #[test]
    fn test_initial_empty_state_text() {
        assert_eq!(EmptyState::Initial.title(), "Start Your Movie Search");
    }

    #[test]
    fn test_search_summary_without_search() {
        assert_eq!(
            search_summary(&SearchParams::default(), 0),
            "Search movies, TV shows, and episodes from OMDB database"
        );
    }

    #[test]
    fn test_render_detail() {
        assert_eq!(render_detail(&FetchState::Idle), DetailView::Empty);
        assert_eq!(render_detail(&FetchState::Loading), DetailView::Loading);
        let error = FetchState::Error {
            kind: ErrorKind::Domain,
            message: "Movie not found!".to_string(),
        };
        assert_eq!(
            render_detail(&error),
            DetailView::Error { message: "Movie not found!".to_string() }
        );
    }

    #[test]
    fn test_view_serialization() {
        let json = serde_json::to_string(&SearchView::Empty { state: EmptyState::Initial }).unwrap();
        assert_eq!(json, r#"{"view":"empty","state":{"type":"initial"}}"#);
    }
}
