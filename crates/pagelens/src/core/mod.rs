//! Configuration for the OCR pipeline and search engine.
//!
//! # Example
//!
//! ```rust,no_run
//! use pagelens::core::config::PagelensConfig;
//!
//! # fn example() -> pagelens::Result<()> {
//! let config = PagelensConfig::discover()?.unwrap_or_default();
//! println!("OCR language: {}", config.ocr.language);
//! # Ok(())
//! # }
//! ```

pub mod config;

pub use config::{CONTEXT_RADIUS, OcrConfig, PagelensConfig, RASTER_MAGNIFICATION};
