//! Pagelens - OCR indexing and keyword search for scanned PDFs
//!
//! Pagelens rasterizes each page of a scanned PDF, runs it through an OCR engine,
//! and keeps the recognized text together with the position of every word. The
//! result is cached on disk per document version, so a document is only OCR'd
//! once, and keyword searches return context snippets plus a rectangle to
//! highlight on the page.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pagelens::{PagelensConfig, Session, TesseractCli};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> pagelens::Result<()> {
//! let config = PagelensConfig::discover()?.unwrap_or_default();
//! let backend = Arc::new(TesseractCli::from_config(&config.ocr));
//! let mut session = Session::new(config)?;
//!
//! if !session.load_document("scan.pdf")?.cache_hit {
//!     let handle = session.process_document(backend)?;
//!     let index = handle.wait_with(|event| println!("{:?}", event)).await?;
//!     session.finish_processing(index)?;
//! }
//!
//! for result in session.search("total") {
//!     println!("page {} @ {:?}: {}", result.page, result.bbox, result.context);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **OCR** (`ocr`): the [`OcrBackend`] boundary and the Tesseract CLI backend
//! - **PDF** (`pdf`): lazy pdfium binding and page rasterization
//! - **Processor** (`processor`): page-by-page OCR on a background worker with
//!   progress and status events
//! - **Index** (`index`): page texts plus word-ordinal to bounding-box maps
//! - **Cache** (`cache`): one JSON entry per document fingerprint
//! - **Search** (`search`): case-insensitive literal matching with context
//! - **Highlight** (`highlight`): page units to screen pixels
//! - **Session** (`session`): the facade a viewer or CLI drives

#![deny(unsafe_code)]

pub mod cache;
pub mod core;
pub mod document;
pub mod error;
pub mod highlight;
pub mod index;
pub mod ocr;
pub mod pdf;
pub mod processor;
pub mod search;
pub mod session;
pub mod types;

pub use error::{PagelensError, Result};
pub use types::*;

pub use cache::{CacheStats, DocumentCache, Fingerprint, fingerprint};
pub use crate::core::config::{OcrConfig, PagelensConfig};
pub use document::{DocumentIdentity, DocumentOpener, LoadedDocument, PageSource, PdfiumOpener, load_document};
pub use highlight::{HighlightTransform, ZoomLevel};
pub use index::{DocumentIndex, PageLocations};
pub use ocr::{OcrBackend, OcrLine, OcrToken, TesseractCli};
pub use processor::{
    ProcessingEvent, ProcessingHandle, ProcessorOptions, RASTER_MAGNIFICATION, process_document, spawn_processing,
};
pub use search::{CONTEXT_RADIUS, SearchOptions, search, search_with_options};
pub use session::{LoadOutcome, Session};
