//! PDF page rasterization through `pdfium-render`.
//!
//! Pdfium is bound to the system library lazily, on the first document opened.
//! Pages are rendered on demand so only one bitmap is alive at a time.
//!
//! # Example
//!
//! ```rust,no_run
//! use pagelens::document::PageSource;
//! use pagelens::pdf::PdfPageSource;
//!
//! # fn example() -> pagelens::Result<()> {
//! let source = PdfPageSource::from_bytes(std::fs::read("scan.pdf")?)?;
//! let first = source.render_page(0, 2.0)?;
//! println!("{} pages, first is {}x{}", source.page_count(), first.width(), first.height());
//! # Ok(())
//! # }
//! ```
mod bindings;
pub mod error;
pub mod rendering;

pub use error::PdfError;
pub use rendering::{PdfPageSource, PdfRenderer};
