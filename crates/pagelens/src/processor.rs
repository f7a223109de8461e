//! Page processor: rasterize, recognize and index every page of a document.
//!
//! Pages are processed strictly in order on a single worker. A page that fails
//! at any step becomes an empty page and processing moves on, so the resulting
//! index always has exactly one entry per page.
//!
//! Notifications go out over an unbounded channel as [`ProcessingEvent`]s:
//! exactly one `Progress` per page in page order, plus `Status` messages for page
//! failures, cache write failures and completion. Sends never block, and a
//! dropped receiver is ignored.

use crate::cache::DocumentCache;
use crate::core::config::PagelensConfig;
use crate::document::{LoadedDocument, PageSource};
use crate::index::{DocumentIndex, DocumentIndexBuilder, PageBuilder, PageLocations};
use crate::ocr::OcrBackend;
use crate::{PagelensError, Result};
use image::DynamicImage;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

pub use crate::core::config::RASTER_MAGNIFICATION;

pub const COMPLETED_STATUS: &str = "PDF processing completed";

/// Notification from a processing run.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingEvent {
    /// `completed` of `total` pages are done (successfully or not).
    Progress { completed: usize, total: usize },
    /// Human-readable status line.
    Status(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorOptions {
    /// Raster magnification `M`; stored boxes are divided by it.
    pub magnification: f64,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            magnification: RASTER_MAGNIFICATION,
        }
    }
}

impl From<&PagelensConfig> for ProcessorOptions {
    fn from(config: &PagelensConfig) -> Self {
        Self {
            magnification: config.magnification,
        }
    }
}

/// OCR one page into its text and word locations.
///
/// Tokens are taken in line-then-word order. Each box is the axis-aligned hull
/// of the token's quadrilateral, descaled to page units.
pub fn process_page(
    source: &dyn PageSource,
    backend: &dyn OcrBackend,
    index: usize,
    magnification: f64,
) -> Result<(String, PageLocations)> {
    let image = source.render_page(index, magnification)?;
    recognize_page(&image, backend, magnification)
}

fn recognize_page(
    image: &DynamicImage,
    backend: &dyn OcrBackend,
    magnification: f64,
) -> Result<(String, PageLocations)> {
    let lines = backend.recognize(image)?;

    let mut page = PageBuilder::new();
    for token in lines.iter().flatten() {
        page.push(&token.text, token.bounding_box().descale(magnification));
    }

    Ok(page.finish())
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

fn notify(events: &UnboundedSender<ProcessingEvent>, event: ProcessingEvent) {
    // The receiver going away does not stop processing.
    let _ = events.send(event);
}

/// Build the index of `document`, then store it in `cache` if one is given.
///
/// Never fails as a whole: page errors and cache write errors are reported as
/// `Status` events and logged.
pub fn process_document(
    document: &LoadedDocument,
    backend: &dyn OcrBackend,
    options: &ProcessorOptions,
    cache: Option<&DocumentCache>,
    events: &UnboundedSender<ProcessingEvent>,
) -> DocumentIndex {
    let total = document.page_count();
    let span = tracing::info_span!(
        "process_document",
        fingerprint = %document.fingerprint(),
        pages = total,
        backend = backend.name()
    );
    let _enter = span.enter();

    tracing::info!(path = %document.identity().path().display(), "Processing started");
    let run_start = Instant::now();

    let mut builder = DocumentIndexBuilder::new(document.fingerprint().clone(), total);
    let mut failed_pages = 0usize;

    let mut page_start = Instant::now();
    document.source().render_each(options.magnification, &mut |index, image| {
        match image.and_then(|image| recognize_page(&image, backend, options.magnification)) {
            Ok((text, locations)) => {
                tracing::debug!(
                    page = index + 1,
                    words = locations.len(),
                    elapsed_ms = elapsed_ms(page_start.elapsed()),
                    "Page processed"
                );
                builder.set_page(index, text, locations);
            }
            Err(e) => {
                failed_pages += 1;
                tracing::warn!(page = index + 1, error = %e, "Page processing failed");
                notify(
                    events,
                    ProcessingEvent::Status(format!("Error processing page {}: {}", index + 1, e)),
                );
            }
        }

        notify(
            events,
            ProcessingEvent::Progress {
                completed: index + 1,
                total,
            },
        );
        page_start = Instant::now();
    });

    let index = builder.build();

    if let Some(cache) = cache {
        if let Err(e) = cache.put_index(&index) {
            tracing::warn!(error = %e, "Failed to write cache entry");
            notify(events, ProcessingEvent::Status(format!("Error saving cache: {}", e)));
        }
    }

    tracing::info!(
        failed_pages,
        elapsed_ms = elapsed_ms(run_start.elapsed()),
        "Processing finished"
    );
    notify(events, ProcessingEvent::Status(COMPLETED_STATUS.to_string()));

    index
}

/// A processing run on a background worker.
///
/// Events arrive on `events` while the run is in progress. `join` resolves to the
/// finished index. There is no cancellation; dropping the handle detaches the run.
#[derive(Debug)]
pub struct ProcessingHandle {
    pub events: UnboundedReceiver<ProcessingEvent>,
    pub join: JoinHandle<DocumentIndex>,
}

impl ProcessingHandle {
    /// Wait for the run to finish, draining events into `on_event` as they arrive.
    ///
    /// # Errors
    ///
    /// Returns `PagelensError::Other` if the worker panicked.
    pub async fn wait_with<F>(self, mut on_event: F) -> Result<DocumentIndex>
    where
        F: FnMut(ProcessingEvent),
    {
        let Self { mut events, join } = self;

        // The channel closes when the worker drops its sender, after the last event.
        while let Some(event) = events.recv().await {
            on_event(event);
        }

        join.await
            .map_err(|e| PagelensError::Other(format!("Processing worker failed: {}", e)))
    }

    pub async fn wait(self) -> Result<DocumentIndex> {
        self.wait_with(|_| {}).await
    }
}

/// Run [`process_document`] on a blocking worker thread.
///
/// Must be called from within a tokio runtime.
pub fn spawn_processing(
    document: LoadedDocument,
    backend: Arc<dyn OcrBackend>,
    options: ProcessorOptions,
    cache: Option<DocumentCache>,
) -> ProcessingHandle {
    let (tx, rx) = mpsc::unbounded_channel();

    let join = tokio::task::spawn_blocking(move || {
        process_document(&document, backend.as_ref(), &options, cache.as_ref(), &tx)
    });

    ProcessingHandle { events: rx, join }
}
