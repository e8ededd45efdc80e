//! Search parameters and their query string form
//!
//! [`SearchParams`] is the canonical description of one search intent. The
//! query string in the address bar is its persisted representation, so the
//! codec here must round-trip: parsing a serialized value yields the same
//! value back.

use serde::Serialize;

use crate::error::{OmdbError, Result};
use crate::types::SearchType;

/// Query keys accepted for the search text
const TEXT_KEYS: [&str; 2] = ["s", "search"];
/// Query keys accepted for the year
const YEAR_KEYS: [&str; 2] = ["y", "year"];
const TYPE_KEY: &str = "type";
const PAGE_KEY: &str = "page";

/// Canonical search parameters
///
/// Invariants: `page >= 1`, and `year` is four ASCII digits when present.
/// Also serves as the cache key `(text, kind, year, page)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SearchParams {
    /// Search text as typed
    pub text: String,

    /// Kind of title to search for
    #[serde(rename = "type")]
    pub kind: SearchType,

    /// Optional four-digit release year
    pub year: Option<String>,

    /// 1-based result page
    pub page: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            text: String::new(),
            kind: SearchType::Movie,
            year: None,
            page: 1,
        }
    }
}

impl SearchParams {
    /// Create parameters for page 1 of a text search
    ///
    /// Surrounding whitespace is trimmed from `text`.
    pub fn new(text: impl Into<String>, kind: SearchType) -> Self {
        Self {
            text: trim_text(text.into()),
            kind,
            ..Self::default()
        }
    }

    /// Set the year, validating it
    ///
    /// # Errors
    /// - `Validation` if the year is not four ASCII digits
    pub fn with_year(mut self, year: &str) -> Result<Self> {
        self.year = normalize_year(year)?;
        Ok(self)
    }

    /// Set the page, validating it
    ///
    /// # Errors
    /// - `Validation` if `page` is zero
    pub fn with_page(mut self, page: u32) -> Result<Self> {
        self.page = validate_page(page)?;
        Ok(self)
    }

    /// Same parameters with surrounding whitespace trimmed from the text
    ///
    /// Text is compared verbatim when used as a cache key, so `"heat"` and
    /// `"heat "` must collapse to one value before that.
    pub fn normalized(mut self) -> Self {
        self.text = trim_text(self.text);
        self
    }

    /// Whether this describes an actual search
    ///
    /// Empty or whitespace-only text means no search is active.
    pub fn is_active(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Whether two parameter sets differ only in their page
    pub fn same_filter(&self, other: &Self) -> bool {
        self.text == other.text && self.kind == other.kind && self.year == other.year
    }

    /// Serialize to the canonical query string (without a leading `?`)
    ///
    /// # Example
    /// ```
    /// use cinesearch_core::{SearchParams, SearchType};
    /// let params = SearchParams::new("star wars", SearchType::Movie);
    /// assert_eq!(params.to_query_string(), "s=star%20wars&type=movie&page=1");
    /// ```
    pub fn to_query_string(&self) -> String {
        let mut query = format!(
            "s={}&type={}",
            urlencoding::encode(&self.text),
            self.kind.as_str()
        );
        if let Some(year) = &self.year {
            query.push_str("&y=");
            query.push_str(year);
        }
        query.push_str("&page=");
        query.push_str(&self.page.to_string());
        query
    }

    /// Parse a query string, falling back to defaults for missing or bad values
    ///
    /// A leading `?` is ignored, unknown keys are skipped, `+` decodes to a
    /// space. An unknown type becomes `movie`, a zero or non-numeric page
    /// becomes 1 and a malformed year is dropped.
    pub fn from_query_str(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in query_pairs(query) {
            match key.as_str() {
                k if TEXT_KEYS.contains(&k) => params.text = trim_text(value),
                k if YEAR_KEYS.contains(&k) => params.year = normalize_year(&value).ok().flatten(),
                TYPE_KEY => params.kind = value.parse().unwrap_or_default(),
                PAGE_KEY => {
                    params.page = value.parse::<u32>().ok().filter(|p| *p >= 1).unwrap_or(1);
                }
                _ => {}
            }
        }
        params
    }
}

/// Trim surrounding whitespace, reusing the allocation when there is none
pub(crate) fn trim_text(text: String) -> String {
    let trimmed = text.trim();
    if trimmed.len() == text.len() {
        text
    } else {
        trimmed.to_string()
    }
}

/// Whether a query string carries any key this module understands
pub fn has_recognized_params(query: &str) -> bool {
    query_pairs(query).any(|(key, _)| {
        TEXT_KEYS.contains(&key.as_str())
            || YEAR_KEYS.contains(&key.as_str())
            || key == TYPE_KEY
            || key == PAGE_KEY
    })
}

/// Validate and normalize a year input
///
/// Empty or whitespace-only input clears the year.
///
/// # Errors
/// - `Validation` if the trimmed input is not four ASCII digits
pub fn normalize_year(year: &str) -> Result<Option<String>> {
    let trimmed = year.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.len() == 4 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        Ok(Some(trimmed.to_string()))
    } else {
        Err(OmdbError::Validation(format!(
            "year must be four digits, got {trimmed:?}"
        )))
    }
}

/// Validate a 1-based page number
///
/// # Errors
/// - `Validation` if `page` is zero
pub fn validate_page(page: u32) -> Result<u32> {
    if page == 0 {
        Err(OmdbError::Validation("page must be at least 1".to_string()))
    } else {
        Ok(page)
    }
}

/// Split a query string into decoded key/value pairs
fn query_pairs(query: &str) -> impl Iterator<Item = (String, String)> + '_ {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}
