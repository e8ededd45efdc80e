//! Search query state synchronized with the address bar
//!
//! Holds the canonical [`SearchParams`] and keeps the location's query
//! string identical to it. The location is the persisted copy; the
//! in-memory params are a cache of it.

use tracing::debug;

use crate::error::Result;
use crate::location::QueryLocation;
use crate::params::{
    SearchParams, has_recognized_params, normalize_year, trim_text, validate_page,
};
use crate::types::SearchType;

/// Canonical search parameters bound to a location
#[derive(Debug)]
pub struct SearchQueryState<L> {
    params: SearchParams,
    location: L,
}

impl<L: QueryLocation> SearchQueryState<L> {
    /// Bind to a location, initializing it from `defaults` if needed
    ///
    /// When the location carries no recognized parameter, the state takes
    /// `defaults` and the canonical query is written once (replacing the
    /// current entry). Otherwise the state is parsed from the location and
    /// nothing is written.
    pub fn mount(mut location: L, defaults: SearchParams) -> Self {
        let query = location.query();
        let params = if has_recognized_params(&query) {
            SearchParams::from_query_str(&query)
        } else {
            let canonical = defaults.to_query_string();
            debug!(query = %canonical, "initializing search query from defaults");
            location.replace_query(canonical);
            defaults
        };
        Self { params, location }
    }

    /// Current canonical parameters
    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// The bound location
    pub fn location(&self) -> &L {
        &self.location
    }

    /// Mutable access to the bound location (e.g., for history navigation)
    ///
    /// Call [`sync_from_location`](Self::sync_from_location) afterwards.
    pub fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }

    /// Whether a search is active (text is not blank)
    pub fn is_active(&self) -> bool {
        self.params.is_active()
    }

    /// Change the search text and go back to page 1
    ///
    /// The text is stored and written trimmed.
    pub fn set_text(&mut self, text: impl Into<String>) -> &SearchParams {
        self.params.text = trim_text(text.into());
        self.params.page = 1;
        self.write()
    }

    /// Change the title kind and go back to page 1
    pub fn set_kind(&mut self, kind: SearchType) -> &SearchParams {
        self.params.kind = kind;
        self.params.page = 1;
        self.write()
    }

    /// Change or clear the year and go back to page 1
    ///
    /// # Errors
    /// - `Validation` if a non-empty year is not four digits; state is unchanged
    pub fn set_year(&mut self, year: &str) -> Result<&SearchParams> {
        let year = normalize_year(year)?;
        self.params.year = year;
        self.params.page = 1;
        Ok(self.write())
    }

    /// Change the page, leaving every other field alone
    ///
    /// # Errors
    /// - `Validation` if `page` is zero; state is unchanged
    pub fn set_page(&mut self, page: u32) -> Result<&SearchParams> {
        self.params.page = validate_page(page)?;
        Ok(self.write())
    }

    /// Replace every field at once (form submit), resetting to page 1
    pub fn replace(&mut self, params: SearchParams) -> &SearchParams {
        let mut params = params.normalized();
        params.page = 1;
        self.params = params;
        self.write()
    }

    /// Re-read parameters from the location after back/forward navigation
    pub fn sync_from_location(&mut self) -> &SearchParams {
        self.params = SearchParams::from_query_str(&self.location.query());
        &self.params
    }

    fn write(&mut self) -> &SearchParams {
        let query = self.params.to_query_string();
        if query != self.location.query() {
            self.location.push_query(query);
        }
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::MemoryLocation;

    fn mounted(query: &str) -> SearchQueryState<MemoryLocation> {
        SearchQueryState::mount(MemoryLocation::new(query), SearchParams::default())
    }

    #[test]
    fn test_mount_writes_defaults_once() {
        let state = mounted("");
        assert_eq!(state.params(), &SearchParams::default());
        assert_eq!(state.location().query(), "s=&type=movie&page=1");
        assert_eq!(state.location().history_len(), 1);
    }

    #[test]
    fn test_mount_reads_existing_params_without_writing() {
        let state = mounted("s=heat&type=movie&y=1995&page=2");
        assert_eq!(state.params().text, "heat");
        assert_eq!(state.params().page, 2);
        assert_eq!(state.location().query(), "s=heat&type=movie&y=1995&page=2");
    }

    #[test]
    fn test_mount_ignores_unrecognized_params() {
        let state = mounted("utm_source=mail");
        assert_eq!(state.location().query(), "s=&type=movie&page=1");
    }

    #[test]
    fn test_set_text_resets_page_and_writes_url() {
        let mut state = mounted("s=heat&type=movie&page=3");
        state.set_text("alien");
        assert_eq!(state.params().page, 1);
        assert_eq!(state.location().query(), "s=alien&type=movie&page=1");
    }

    #[test]
    fn test_changing_type_or_year_on_page_three_resets_page() {
        let mut state = mounted("s=heat&type=movie&page=3");
        state.set_kind(SearchType::Series);
        assert_eq!(state.params().page, 1);

        state.set_page(3).unwrap();
        state.set_year("1995").unwrap();
        assert_eq!(state.params().page, 1);
        assert_eq!(state.location().query(), "s=heat&type=series&y=1995&page=1");
    }

    #[test]
    fn test_set_page_keeps_other_fields() {
        let mut state = mounted("s=heat&type=series&y=1995&page=1");
        state.set_page(4).unwrap();
        let params = state.params();
        assert_eq!(params.text, "heat");
        assert_eq!(params.kind, SearchType::Series);
        assert_eq!(params.year.as_deref(), Some("1995"));
        assert_eq!(params.page, 4);
    }

    #[test]
    fn test_invalid_mutations_leave_state_unchanged() {
        let mut state = mounted("s=heat&type=movie&page=2");
        assert!(state.set_page(0).is_err());
        assert!(state.set_year("95").is_err());
        assert_eq!(state.params().page, 2);
        assert_eq!(state.location().query(), "s=heat&type=movie&page=2");
    }

    #[test]
    fn test_empty_year_clears_it() {
        let mut state = mounted("s=heat&type=movie&y=1995&page=1");
        state.set_year("").unwrap();
        assert_eq!(state.params().year, None);
    }

    #[test]
    fn test_back_navigation_restores_params() {
        let mut state = mounted("");
        state.set_text("heat");
        state.set_page(2).unwrap();

        assert!(state.location_mut().back());
        let params = state.sync_from_location().clone();
        assert_eq!(params.text, "heat");
        assert_eq!(params.page, 1);

        assert!(state.location_mut().forward());
        assert_eq!(state.sync_from_location().page, 2);
    }

    #[test]
    fn test_replace_resets_page() {
        let mut state = mounted("s=heat&type=movie&page=5");
        let mut params = SearchParams::new("ronin", SearchType::Movie);
        params.page = 9;
        state.replace(params);
        assert_eq!(state.params().page, 1);
        assert_eq!(state.params().text, "ronin");
    }

    #[test]
    fn test_trailing_space_never_reaches_url() {
        let mut state = mounted("");
        state.set_text("heat ");
        assert_eq!(state.params().text, "heat");
        assert_eq!(state.location().query(), "s=heat&type=movie&page=1");

        let history = state.location().history_len();
        state.set_text(" heat");
        assert_eq!(state.location().history_len(), history);

        state.replace(SearchParams {
            text: " ronin ".to_string(),
            ..SearchParams::default()
        });
        assert_eq!(state.location().query(), "s=ronin&type=movie&page=1");
    }

    #[test]
    fn test_whitespace_text_is_not_active() {
        let mut state = mounted("");
        state.set_text("   ");
        assert!(!state.is_active());
    }
}
