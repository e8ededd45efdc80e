//! Address bar abstraction
//!
//! The query string is the only state that outlives a page view. Search
//! state writes to it through [`QueryLocation`] so the real address bar,
//! a webview bridge, or a test double can sit behind it.

/// Read/write access to the current query string
pub trait QueryLocation {
    /// Current query string, without a leading `?`
    fn query(&self) -> String;

    /// Navigate to a new query string, adding a history entry
    fn push_query(&mut self, query: String);

    /// Replace the current query string without adding a history entry
    fn replace_query(&mut self, query: String);
}

/// In-memory location with a browser-like history stack
#[derive(Debug, Clone)]
pub struct MemoryLocation {
    entries: Vec<String>,
    cursor: usize,
}

impl MemoryLocation {
    /// Create a location starting at `query`
    pub fn new(query: impl Into<String>) -> Self {
        let query: String = query.into();
        Self {
            entries: vec![query.trim_start_matches('?').to_string()],
            cursor: 0,
        }
    }

    /// Go back one entry; returns false at the start of history
    pub fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Go forward one entry; returns false at the end of history
    pub fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Number of history entries
    pub fn history_len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new("")
    }
}

impl QueryLocation for MemoryLocation {
    fn query(&self) -> String {
        self.entries
            .get(self.cursor)
            .cloned()
            .unwrap_or_default()
    }

    fn push_query(&mut self, query: String) {
        // Navigating discards any forward entries.
        self.entries.truncate(self.cursor + 1);
        self.entries.push(query);
        self.cursor = self.entries.len() - 1;
    }

    fn replace_query(&mut self, query: String) {
        match self.entries.get_mut(self.cursor) {
            Some(entry) => *entry = query,
            None => self.entries.push(query),
        }
    }
}
