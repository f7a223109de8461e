//! In-memory document index: page texts plus per-page word locations.
//!
//! Word ordinals are assigned while a page is built from OCR tokens and recovered
//! at search time by re-tokenizing the page text. Both sides go through
//! [`tokenize`], so the two numberings agree as long as every OCR token is
//! non-empty and free of whitespace.
//!
//! A token that breaks this rule is kept verbatim. Everything after it on the
//! same page then resolves to the wrong ordinal (or to none), and the builder logs
//! a warning when that happens.

use crate::cache::Fingerprint;
use crate::types::BoundingBox;
use crate::{PagelensError, Result};
use std::collections::BTreeMap;

/// Word ordinal to bounding box for a single page.
pub type PageLocations = BTreeMap<usize, BoundingBox>;

/// A whitespace-delimited token and its byte offset within the page text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub start: usize,
    pub text: &'a str,
}

impl Token<'_> {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Split `text` into whitespace-delimited tokens, in order.
pub fn tokenize(text: &str) -> impl Iterator<Item = Token<'_>> + '_ {
    let base = text.as_ptr() as usize;
    text.split_whitespace().map(move |word| Token {
        start: word.as_ptr() as usize - base,
        text: word,
    })
}

/// Number of tokens in `text[..byte_offset]`.
///
/// At a word start this is the ordinal of that word. An offset inside a word
/// counts the partial word too, so it lands on the following word.
pub fn word_ordinal_at(text: &str, byte_offset: usize) -> usize {
    text.get(..byte_offset).map_or(0, |prefix| tokenize(prefix).count())
}

/// Accumulates one page's tokens in OCR order.
#[derive(Debug, Default)]
pub struct PageBuilder {
    tokens: Vec<String>,
    locations: PageLocations,
}

impl PageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token and record its box under the next ordinal.
    pub fn push(&mut self, text: &str, bbox: BoundingBox) {
        let ordinal = self.tokens.len();

        if text.is_empty() || text.chars().any(char::is_whitespace) {
            tracing::warn!(
                ordinal,
                token = text,
                "OCR token is empty or contains whitespace; later highlights on this page may be misplaced"
            );
        }

        self.locations.insert(ordinal, bbox);
        self.tokens.push(text.to_string());
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Join tokens with single spaces.
    pub fn finish(self) -> (String, PageLocations) {
        (self.tokens.join(" "), self.locations)
    }
}

/// Index of a whole document.
///
/// Always holds exactly one text and one location map per page.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentIndex {
    fingerprint: Fingerprint,
    texts: Vec<String>,
    locations: Vec<PageLocations>,
}

impl DocumentIndex {
    /// Build an index from restored or computed parts.
    ///
    /// # Errors
    ///
    /// Returns `PagelensError::Validation` if the two sequences differ in length.
    pub fn from_parts(fingerprint: Fingerprint, texts: Vec<String>, locations: Vec<PageLocations>) -> Result<Self> {
        if texts.len() != locations.len() {
            return Err(PagelensError::validation(format!(
                "Index has {} page texts but {} location maps",
                texts.len(),
                locations.len()
            )));
        }

        Ok(Self {
            fingerprint,
            texts,
            locations,
        })
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn page_count(&self) -> usize {
        self.texts.len()
    }

    pub fn page_texts(&self) -> &[String] {
        &self.texts
    }

    pub fn locations(&self) -> &[PageLocations] {
        &self.locations
    }

    /// Text of the 0-based page `index`.
    pub fn page_text(&self, index: usize) -> Option<&str> {
        self.texts.get(index).map(String::as_str)
    }

    pub fn page_locations(&self, index: usize) -> Option<&PageLocations> {
        self.locations.get(index)
    }

    /// Box of word `ordinal` on 0-based page `index`.
    pub fn word_bbox(&self, index: usize, ordinal: usize) -> Option<BoundingBox> {
        self.locations.get(index)?.get(&ordinal).copied()
    }

    pub fn into_parts(self) -> (Fingerprint, Vec<String>, Vec<PageLocations>) {
        (self.fingerprint, self.texts, self.locations)
    }
}

/// Collects pages for a fresh run.
///
/// Starts with one empty page per document page, so a page that is never filled
/// stays empty and numbering stays dense.
#[derive(Debug)]
pub struct DocumentIndexBuilder {
    fingerprint: Fingerprint,
    texts: Vec<String>,
    locations: Vec<PageLocations>,
}

impl DocumentIndexBuilder {
    pub fn new(fingerprint: Fingerprint, page_count: usize) -> Self {
        Self {
            fingerprint,
            texts: vec![String::new(); page_count],
            locations: vec![PageLocations::new(); page_count],
        }
    }

    /// Store a finished page. Out-of-range indices are ignored.
    pub fn set_page(&mut self, index: usize, text: String, locations: PageLocations) {
        if let (Some(slot_text), Some(slot_locations)) = (self.texts.get_mut(index), self.locations.get_mut(index)) {
            *slot_text = text;
            *slot_locations = locations;
        }
    }

    pub fn build(self) -> DocumentIndex {
        DocumentIndex {
            fingerprint: self.fingerprint,
            texts: self.texts,
            locations: self.locations,
        }
    }
}
