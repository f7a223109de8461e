//! Error types for pagelens.
//!
//! Every fallible operation in the library returns [`PagelensError`].
//!
//! # Error Handling Philosophy
//!
//! **System errors bubble up unchanged:**
//! - `PagelensError::Io` (from `std::io::Error`) - unreadable documents, permission errors
//!
//! **Application errors carry context:**
//! - `Rendering` - a page could not be rasterized
//! - `Ocr` - the OCR capability failed on a bitmap
//! - `Cache` - a cache entry could not be written (callers downgrade this to a warning)
//! - `Validation` - invalid configuration or input
//!
//! Some failures are deliberately *not* errors: a missing or corrupt cache entry is a
//! cache miss, and a page that fails to process becomes an empty page.
//!
//! # Example
//!
//! ```rust
//! use pagelens::{PagelensError, Result};
//!
//! fn read_config(path: &str) -> Result<String> {
//!     let content = std::fs::read_to_string(path)?;
//!
//!     if content.is_empty() {
//!         return Err(PagelensError::validation(format!("Config file is empty: {}", path)));
//!     }
//!
//!     Ok(content)
//! }
//! ```
use thiserror::Error;

/// Result type alias using `PagelensError`.
pub type Result<T> = std::result::Result<T, PagelensError>;

/// Main error type for all pagelens operations.
#[derive(Debug, Error)]
pub enum PagelensError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Rendering error: {message}")]
    Rendering {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Image processing error: {message}")]
    ImageProcessing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Cache error: {message}")]
    Cache {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for PagelensError {
    fn from(err: serde_json::Error) -> Self {
        PagelensError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<crate::pdf::error::PdfError> for PagelensError {
    fn from(err: crate::pdf::error::PdfError) -> Self {
        use crate::pdf::error::PdfError;

        let message = err.to_string();
        match err {
            PdfError::InvalidPdf(_) | PdfError::PasswordRequired => PagelensError::Validation {
                message,
                source: Some(Box::new(err)),
            },
            PdfError::PageNotFound(_) | PdfError::RenderingFailed(_) => PagelensError::Rendering {
                message,
                source: Some(Box::new(err)),
            },
        }
    }
}

impl From<image::ImageError> for PagelensError {
    fn from(err: image::ImageError) -> Self {
        PagelensError::ImageProcessing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl PagelensError {
    error_constructor!(validation, Validation);
    error_constructor!(rendering, Rendering);
    error_constructor!(ocr, Ocr);
    error_constructor!(image_processing, ImageProcessing);
    error_constructor!(cache, Cache);
    error_constructor!(serialization, Serialization);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PagelensError = io_err.into();
        assert!(matches!(err, PagelensError::Io(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_rendering_error() {
        let err = PagelensError::rendering("page 3 has no content stream");
        assert_eq!(err.to_string(), "Rendering error: page 3 has no content stream");
    }

    #[test]
    fn test_ocr_error_with_source() {
        let source = std::io::Error::other("tesseract crashed");
        let err = PagelensError::ocr_with_source("OCR failed", source);
        assert_eq!(err.to_string(), "OCR error: OCR failed");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_cache_error() {
        let err = PagelensError::cache("disk full");
        assert_eq!(err.to_string(), "Cache error: disk full");
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_validation_error() {
        let err = PagelensError::validation("magnification must be positive");
        assert_eq!(err.to_string(), "Validation error: magnification must be positive");
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: PagelensError = json_err.into();
        assert!(matches!(err, PagelensError::Serialization { .. }));
        assert!(err.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_pdf_error_conversion() {
        use crate::pdf::PdfError;

        let err: PagelensError = PdfError::InvalidPdf("corrupt xref".to_string()).into();
        assert!(matches!(err, PagelensError::Validation { .. }));
        assert_eq!(err.to_string(), "Validation error: Invalid PDF: corrupt xref");

        let err: PagelensError = PdfError::PageNotFound(4).into();
        assert!(matches!(err, PagelensError::Rendering { .. }));
    }

    #[test]
    fn test_missing_dependency_error() {
        let err = PagelensError::MissingDependency("tesseract not found".to_string());
        assert_eq!(err.to_string(), "Missing dependency: tesseract not found");
    }

    #[test]
    fn test_io_error_bubbles_unchanged() {
        fn read_file() -> Result<String> {
            let content = std::fs::read_to_string("/nonexistent/pagelens/file.txt")?;
            Ok(content)
        }

        assert!(matches!(read_file().unwrap_err(), PagelensError::Io(_)));
    }
}
