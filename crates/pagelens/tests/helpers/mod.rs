//! Shared fixtures for integration tests.
//!
//! Documents are real files on disk so identities, modification times and
//! fingerprints are real. Their pages come from [`ScriptedPages`] and their text
//! from [`ScriptedOcr`] instead of pdfium and tesseract.
#![allow(dead_code)]

use image::DynamicImage;
use pagelens::document::{DocumentOpener, PageSource};
use pagelens::ocr::{OcrBackend, OcrLine, OcrToken};
use pagelens::{PagelensError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Horizontal distance between scripted words, in bitmap pixels.
pub const WORD_PITCH: f64 = 20.0;
pub const WORD_WIDTH: f64 = 16.0;
pub const WORD_HEIGHT: f64 = 10.0;

/// Page `i` renders as a `(i + 1) x 1` bitmap so the OCR side can tell pages apart.
pub struct ScriptedPages {
    pub pages: usize,
}

impl PageSource for ScriptedPages {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn render_page(&self, index: usize, _magnification: f64) -> Result<DynamicImage> {
        if index >= self.pages {
            return Err(PagelensError::rendering(format!("page {} out of range", index)));
        }
        Ok(DynamicImage::new_rgb8(index as u32 + 1, 1))
    }
}

/// Returns a fixed text per page; `None` makes that page's OCR call fail.
pub struct ScriptedOcr {
    pages: Vec<Option<String>>,
    calls: AtomicUsize,
}

impl ScriptedOcr {
    pub fn new(pages: &[Option<&str>]) -> Self {
        Self {
            pages: pages.iter().map(|page| page.map(str::to_string)).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrBackend for ScriptedOcr {
    fn name(&self) -> &str {
        "scripted"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<Vec<OcrLine>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let index = image.width() as usize - 1;

        match self.pages.get(index) {
            Some(Some(text)) => Ok(scripted_lines(text)),
            Some(None) => Err(PagelensError::ocr(format!("scripted failure on page {}", index + 1))),
            None => Err(PagelensError::ocr("no script for page")),
        }
    }
}

/// One OCR line per text line; word `i` of a line sits at `x = i * WORD_PITCH`.
pub fn scripted_lines(text: &str) -> Vec<OcrLine> {
    text.lines()
        .enumerate()
        .map(|(row, line)| {
            line.split_whitespace()
                .enumerate()
                .map(|(i, word)| {
                    OcrToken::from_rect(
                        i as f64 * WORD_PITCH,
                        row as f64 * WORD_HEIGHT * 2.0,
                        WORD_WIDTH,
                        WORD_HEIGHT,
                        word,
                        95.0,
                    )
                })
                .collect()
        })
        .filter(|line: &OcrLine| !line.is_empty())
        .collect()
}

/// Opens every path as a document with `pages` scripted pages.
pub struct ScriptedOpener {
    pub pages: usize,
}

impl DocumentOpener for ScriptedOpener {
    fn open(&self, _path: &Path) -> Result<Arc<dyn PageSource>> {
        Ok(Arc::new(ScriptedPages { pages: self.pages }))
    }
}

/// Rejects every document.
pub struct BrokenOpener;

impl DocumentOpener for BrokenOpener {
    fn open(&self, path: &Path) -> Result<Arc<dyn PageSource>> {
        Err(PagelensError::validation(format!("Invalid PDF: {}", path.display())))
    }
}

/// Write a placeholder document file.
pub fn write_document(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"%PDF-1.4\n% scripted\n").unwrap();
    path
}

/// Route library logs to the test output when `RUST_LOG` is set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
