//! Most-recently-used search history

use serde::{Deserialize, Serialize};

/// The history keeps at most this many entries
pub const MAX_RECENTS: usize = 5;

/// Recent city searches, newest first, case-insensitively deduplicated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecentSearches {
    entries: Vec<String>,
}

impl RecentSearches {
    /// Record a search. An existing entry with the same name (ignoring case)
    /// moves to the front instead of duplicating; the oldest entry drops off
    /// once the list is full.
    pub fn push(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }

        self.entries
            .retain(|existing| !existing.eq_ignore_ascii_case(name));
        self.entries.insert(0, name.to_string());
        self.entries.truncate(MAX_RECENTS);
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Entries containing the query, case-insensitively
    pub fn matching<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a str> {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .filter(move |entry| entry.to_lowercase().contains(&query))
            .map(String::as_str)
    }
}
