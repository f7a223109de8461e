//! Loaded documents: identity, fingerprint and page access.

use crate::cache::{Fingerprint, fingerprint};
use crate::pdf::PdfPageSource;
use crate::{PagelensError, Result};
use image::DynamicImage;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Pages of an opened document, rendered on demand.
pub trait PageSource: Send + Sync {
    fn page_count(&self) -> usize;

    /// Rasterize the 0-based page `index` with every dimension scaled by `magnification`.
    fn render_page(&self, index: usize, magnification: f64) -> Result<DynamicImage>;

    /// Rasterize every page in order, handing each outcome to `visit`.
    ///
    /// Sources with a costly open step override this to open once per pass.
    fn render_each(&self, magnification: f64, visit: &mut dyn FnMut(usize, Result<DynamicImage>)) {
        for index in 0..self.page_count() {
            visit(index, self.render_page(index, magnification));
        }
    }
}

/// Turns a path into a [`PageSource`].
pub trait DocumentOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Arc<dyn PageSource>>;
}

/// Opens PDFs with pdfium.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumOpener;

impl DocumentOpener for PdfiumOpener {
    fn open(&self, path: &Path) -> Result<Arc<dyn PageSource>> {
        let bytes = std::fs::read(path)?;
        Ok(Arc::new(PdfPageSource::from_bytes(bytes)?))
    }
}

/// What a document is on disk when it is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentIdentity {
    path: PathBuf,
    modified: SystemTime,
    size: u64,
}

impl DocumentIdentity {
    /// Stat `path`, resolving it to an absolute canonical path first.
    ///
    /// # Errors
    ///
    /// `PagelensError::Io` if the path does not exist or cannot be stat'ed, and
    /// `PagelensError::Validation` if it is not a regular file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = std::fs::canonicalize(path.as_ref())?;
        let metadata = std::fs::metadata(&path)?;

        if !metadata.is_file() {
            return Err(PagelensError::validation(format!("Not a file: {}", path.display())));
        }

        Ok(Self {
            modified: metadata.modified()?,
            size: metadata.len(),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Cache key for this version of the file.
    pub fn fingerprint(&self) -> Fingerprint {
        fingerprint(&self.path, self.modified)
    }
}

/// A document ready to be processed.
#[derive(Clone)]
pub struct LoadedDocument {
    identity: DocumentIdentity,
    fingerprint: Fingerprint,
    source: Arc<dyn PageSource>,
}

impl LoadedDocument {
    pub fn new(identity: DocumentIdentity, source: Arc<dyn PageSource>) -> Self {
        Self {
            fingerprint: identity.fingerprint(),
            identity,
            source,
        }
    }

    pub fn identity(&self) -> &DocumentIdentity {
        &self.identity
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn source(&self) -> &dyn PageSource {
        self.source.as_ref()
    }

    pub fn page_count(&self) -> usize {
        self.source.page_count()
    }
}

impl fmt::Debug for LoadedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedDocument")
            .field("identity", &self.identity)
            .field("fingerprint", &self.fingerprint)
            .field("page_count", &self.page_count())
            .finish()
    }
}

/// Stat and open `path`.
pub fn load_document(path: impl AsRef<Path>, opener: &dyn DocumentOpener) -> Result<LoadedDocument> {
    let identity = DocumentIdentity::from_path(path)?;
    let source = opener.open(identity.path())?;

    tracing::debug!(
        path = %identity.path().display(),
        pages = source.page_count(),
        "Document opened"
    );

    Ok(LoadedDocument::new(identity, source))
}
