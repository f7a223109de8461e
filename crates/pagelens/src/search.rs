//! Keyword search over a [`DocumentIndex`].
//!
//! Matching is a case-insensitive literal substring scan. Results come back in
//! natural order: page ascending, then left to right within a page. There is no
//! ranking and no deduplication of overlapping occurrences.
//!
//! # Example
//!
//! ```rust
//! use pagelens::cache::fingerprint;
//! use pagelens::index::{DocumentIndex, PageLocations};
//! use pagelens::search::search;
//! use std::path::Path;
//! use std::time::UNIX_EPOCH;
//!
//! # fn example() -> pagelens::Result<()> {
//! let index = DocumentIndex::from_parts(
//!     fingerprint(Path::new("/scans/a.pdf"), UNIX_EPOCH),
//!     vec!["the quick brown fox".to_string()],
//!     vec![PageLocations::new()],
//! )?;
//!
//! let results = search(&index, "QUICK");
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].page, 1);
//! assert_eq!(results[0].position, 4);
//! assert_eq!(results[0].context, "...the **quick** brown fox...");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::index::{DocumentIndex, word_ordinal_at};
use crate::types::{BoundingBox, SearchResult};
use regex::{Regex, RegexBuilder};

pub use crate::core::config::CONTEXT_RADIUS;

pub const ELLIPSIS: &str = "...";
pub const EMPHASIS: &str = "**";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Characters of context on each side of the match.
    pub context_radius: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            context_radius: CONTEXT_RADIUS,
        }
    }
}

/// Search with the default context radius.
pub fn search(index: &DocumentIndex, keyword: &str) -> Vec<SearchResult> {
    search_with_options(index, keyword, &SearchOptions::default())
}

pub fn search_with_options(index: &DocumentIndex, keyword: &str, options: &SearchOptions) -> Vec<SearchResult> {
    if keyword.is_empty() {
        return Vec::new();
    }

    let Some(pattern) = literal_pattern(keyword) else {
        return Vec::new();
    };

    let mut results = Vec::new();

    for (page_index, text) in index.page_texts().iter().enumerate() {
        for found in pattern.find_iter(text) {
            let ordinal = word_ordinal_at(text, found.start());
            let bbox = index.word_bbox(page_index, ordinal).unwrap_or_else(|| {
                tracing::debug!(page = page_index + 1, ordinal, "No word location for match");
                BoundingBox::ZERO
            });

            results.push(SearchResult {
                page: page_index + 1,
                context: context_window(text, found.start(), found.end(), options.context_radius),
                position: text[..found.start()].chars().count(),
                bbox,
            });
        }
    }

    results
}

fn literal_pattern(keyword: &str) -> Option<Regex> {
    match RegexBuilder::new(&regex::escape(keyword)).case_insensitive(true).build() {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            // Only reachable for keywords past the regex size limit.
            tracing::warn!(error = %e, "Keyword could not be compiled");
            None
        }
    }
}

/// Context around the match at byte range `start..end`, in characters.
///
/// The window is clipped to the text. The matched span is wrapped in
/// [`EMPHASIS`] and the whole window framed with [`ELLIPSIS`].
fn context_window(text: &str, start: usize, end: usize, radius: usize) -> String {
    let before: Vec<char> = text[..start].chars().collect();
    let leading: String = before[before.len().saturating_sub(radius)..].iter().collect();
    let trailing: String = text[end..].chars().take(radius).collect();
    let matched = &text[start..end];

    format!("{ELLIPSIS}{leading}{EMPHASIS}{matched}{EMPHASIS}{trailing}{ELLIPSIS}")
}
