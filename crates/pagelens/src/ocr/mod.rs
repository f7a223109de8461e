//! OCR capability boundary.
//!
//! The pipeline only needs one thing from an OCR engine: given a page bitmap,
//! return lines of tokens, each with a quadrilateral and a confidence. Any engine
//! can be plugged in by implementing [`OcrBackend`].
//!
//! # Backends
//!
//! - [`TesseractCli`]: runs the `tesseract` binary and parses its TSV output
//!
//! # Example
//!
//! ```rust,no_run
//! use pagelens::ocr::{OcrBackend, TesseractCli};
//!
//! # fn example() -> pagelens::Result<()> {
//! let backend = TesseractCli::default();
//! let bitmap = image::open("page.png")?;
//!
//! for line in backend.recognize(&bitmap)? {
//!     let words: Vec<_> = line.iter().map(|token| token.text.as_str()).collect();
//!     println!("{}", words.join(" "));
//! }
//! # Ok(())
//! # }
//! ```
pub mod tesseract;
pub mod tsv_parser;
pub mod types;

pub use tesseract::TesseractCli;
pub use tsv_parser::{TsvWord, lines_from_words, parse_tsv_words};
pub use types::{OcrLine, OcrToken};

use crate::Result;
use image::DynamicImage;

/// An OCR engine.
///
/// Implementations must be thread-safe: a processing run moves the backend onto
/// a background worker.
pub trait OcrBackend: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Recognize text on a bitmap, in reading order (lines, then words).
    ///
    /// # Errors
    ///
    /// Any error fails the page being processed; the run continues with the
    /// next page.
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<OcrLine>>;
}
