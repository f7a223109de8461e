//! Presentation-facing facade over loading, processing and searching.
//!
//! A [`Session`] owns at most one loaded document and its index. Loading either
//! replaces both or, on failure, leaves the previous ones untouched.
//!
//! # Example
//!
//! ```rust,no_run
//! use pagelens::core::config::PagelensConfig;
//! use pagelens::ocr::TesseractCli;
//! use pagelens::session::Session;
//! use std::sync::Arc;
//!
//! # async fn example() -> pagelens::Result<()> {
//! let config = PagelensConfig::default();
//! let backend = Arc::new(TesseractCli::from_config(&config.ocr));
//! let mut session = Session::new(config)?;
//!
//! let outcome = session.load_document("scan.pdf")?;
//! if !outcome.cache_hit {
//!     let index = session.process_document(backend)?.wait().await?;
//!     session.finish_processing(index)?;
//! }
//!
//! for result in session.search("invoice") {
//!     println!("page {}: {}", result.page, result.context);
//! }
//! # Ok(())
//! # }
//! ```

use crate::cache::{DocumentCache, Fingerprint};
use crate::core::config::PagelensConfig;
use crate::document::{DocumentOpener, LoadedDocument, PdfiumOpener, load_document};
use crate::highlight::{HighlightTransform, ZoomLevel};
use crate::index::DocumentIndex;
use crate::ocr::OcrBackend;
use crate::processor::{ProcessingHandle, ProcessorOptions, spawn_processing};
use crate::search::{SearchOptions, search_with_options};
use crate::types::SearchResult;
use crate::{PagelensError, Result};
use std::path::Path;
use std::sync::Arc;

pub const CACHE_HIT_STATUS: &str = "Loaded OCR results from cache";
pub const NEEDS_PROCESSING_STATUS: &str = "PDF loaded, OCR has not been run yet";

/// Result of a successful [`Session::load_document`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub fingerprint: Fingerprint,
    pub page_count: usize,
    /// The index was restored from the cache and search is ready.
    pub cache_hit: bool,
}

impl LoadOutcome {
    pub fn status_message(&self) -> &'static str {
        if self.cache_hit {
            CACHE_HIT_STATUS
        } else {
            NEEDS_PROCESSING_STATUS
        }
    }
}

pub struct Session {
    config: PagelensConfig,
    cache: Option<DocumentCache>,
    opener: Arc<dyn DocumentOpener>,
    document: Option<LoadedDocument>,
    index: Option<DocumentIndex>,
}

impl Session {
    /// Session that opens PDFs with pdfium.
    pub fn new(config: PagelensConfig) -> Result<Self> {
        Self::with_opener(config, Arc::new(PdfiumOpener))
    }

    /// # Errors
    ///
    /// `PagelensError::Validation` for an invalid config, `PagelensError::Cache`
    /// if caching is enabled and the cache directory cannot be created.
    pub fn with_opener(config: PagelensConfig, opener: Arc<dyn DocumentOpener>) -> Result<Self> {
        config.validate()?;

        let cache = if config.use_cache {
            Some(DocumentCache::new(config.cache_dir.clone())?)
        } else {
            None
        };

        Ok(Self {
            config,
            cache,
            opener,
            document: None,
            index: None,
        })
    }

    pub fn config(&self) -> &PagelensConfig {
        &self.config
    }

    pub fn cache(&self) -> Option<&DocumentCache> {
        self.cache.as_ref()
    }

    pub fn document(&self) -> Option<&LoadedDocument> {
        self.document.as_ref()
    }

    /// Index of the loaded document, once restored or processed.
    pub fn index(&self) -> Option<&DocumentIndex> {
        self.index.as_ref()
    }

    /// Load `path`, restoring its index from the cache when possible.
    ///
    /// On failure the previously loaded document and index stay in place.
    pub fn load_document(&mut self, path: impl AsRef<Path>) -> Result<LoadOutcome> {
        let document = load_document(path.as_ref(), self.opener.as_ref()).inspect_err(|e| {
            tracing::warn!(path = %path.as_ref().display(), error = %e, "Error loading PDF");
        })?;

        let page_count = document.page_count();
        let cached = self
            .cache
            .as_ref()
            .and_then(|cache| cache.get_index(document.fingerprint()))
            .filter(|index| {
                let matches = index.page_count() == page_count;
                if !matches {
                    tracing::debug!(
                        cached_pages = index.page_count(),
                        page_count,
                        "Cached index has a different page count, ignoring it"
                    );
                }
                matches
            });

        let outcome = LoadOutcome {
            fingerprint: document.fingerprint().clone(),
            page_count,
            cache_hit: cached.is_some(),
        };

        tracing::info!(
            fingerprint = %outcome.fingerprint,
            pages = page_count,
            cache_hit = outcome.cache_hit,
            "Document loaded"
        );

        self.document = Some(document);
        self.index = cached;

        Ok(outcome)
    }

    /// Start OCR of the loaded document on a background worker.
    ///
    /// The caller drains the handle and passes the index to
    /// [`finish_processing`](Self::finish_processing). Must be called from within
    /// a tokio runtime.
    pub fn process_document(&self, backend: Arc<dyn OcrBackend>) -> Result<ProcessingHandle> {
        let document = self
            .document
            .clone()
            .ok_or_else(|| PagelensError::validation("No document loaded"))?;

        Ok(spawn_processing(
            document,
            backend,
            ProcessorOptions::from(&self.config),
            self.cache.clone(),
        ))
    }

    /// Install the index produced by a processing run.
    ///
    /// # Errors
    ///
    /// `PagelensError::Validation` if the index belongs to a document other than
    /// the one currently loaded.
    pub fn finish_processing(&mut self, index: DocumentIndex) -> Result<()> {
        match &self.document {
            Some(document) if document.fingerprint() == index.fingerprint() => {
                self.index = Some(index);
                Ok(())
            }
            Some(_) => Err(PagelensError::validation(
                "Processed index belongs to a different document than the one loaded",
            )),
            None => Err(PagelensError::validation("No document loaded")),
        }
    }

    /// Search the current index. Empty before any index exists.
    pub fn search(&self, keyword: &str) -> Vec<SearchResult> {
        let Some(index) = &self.index else {
            return Vec::new();
        };

        let options = SearchOptions {
            context_radius: self.config.context_radius,
        };
        search_with_options(index, keyword, &options)
    }

    /// Transform for drawing highlights over a page shown at `zoom`.
    pub fn highlight_transform(&self, zoom: ZoomLevel) -> HighlightTransform {
        HighlightTransform::new(self.config.magnification, zoom)
    }
}
