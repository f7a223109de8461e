//! Processing pipeline tests: per-page failure policy, event ordering and cache
//! write-back.

mod helpers;

use helpers::*;
use pagelens::cache::DocumentCache;
use pagelens::document::load_document;
use pagelens::processor::{
    COMPLETED_STATUS, ProcessingEvent, ProcessorOptions, process_document, spawn_processing,
};
use pagelens::types::BoundingBox;
use std::sync::Arc;
use tempfile::tempdir;
use tokio::sync::mpsc;

fn drain(rx: &mut mpsc::UnboundedReceiver<ProcessingEvent>) -> Vec<ProcessingEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[test]
fn test_page_count_holds_with_failed_pages() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = write_document(dir.path(), "scan.pdf");
    let document = load_document(&path, &ScriptedOpener { pages: 5 }).unwrap();
    let ocr = ScriptedOcr::new(&[Some("alpha"), None, Some("gamma delta"), None, None]);
    let (tx, _rx) = mpsc::unbounded_channel();

    let index = process_document(&document, &ocr, &ProcessorOptions::default(), None, &tx);

    assert_eq!(ocr.calls(), 5);
    assert_eq!(index.page_count(), 5);
    assert_eq!(index.locations().len(), 5);
    assert_eq!(
        index.page_texts(),
        &["alpha".to_string(), String::new(), "gamma delta".to_string(), String::new(), String::new()]
    );
    for failed in [1, 3, 4] {
        assert!(index.page_locations(failed).unwrap().is_empty());
    }
}

#[test]
fn test_failed_page_does_not_affect_following_pages() {
    let dir = tempdir().unwrap();
    let path = write_document(dir.path(), "scan.pdf");
    let document = load_document(&path, &ScriptedOpener { pages: 3 }).unwrap();
    let ocr = ScriptedOcr::new(&[None, Some("second page words"), Some("third")]);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let index = process_document(&document, &ocr, &ProcessorOptions::default(), None, &tx);

    assert_eq!(index.page_text(0), Some(""));
    assert_eq!(index.page_text(1), Some("second page words"));
    assert_eq!(index.word_bbox(1, 2), Some(BoundingBox::new(20.0, 0.0, 28.0, 5.0)));
    assert_eq!(index.page_text(2), Some("third"));

    let statuses: Vec<String> = drain(&mut rx)
        .into_iter()
        .filter_map(|event| match event {
            ProcessingEvent::Status(message) => Some(message),
            ProcessingEvent::Progress { .. } => None,
        })
        .collect();
    assert_eq!(statuses.len(), 2);
    assert!(statuses[0].starts_with("Error processing page 1: "));
    assert!(statuses[0].contains("scripted failure on page 1"));
    assert_eq!(statuses[1], COMPLETED_STATUS);
}

#[test]
fn test_multiline_page_joins_lines_in_order() {
    let dir = tempdir().unwrap();
    let path = write_document(dir.path(), "scan.pdf");
    let document = load_document(&path, &ScriptedOpener { pages: 1 }).unwrap();
    let ocr = ScriptedOcr::new(&[Some("Invoice 42\nTotal due")]);
    let (tx, _rx) = mpsc::unbounded_channel();

    let index = process_document(&document, &ocr, &ProcessorOptions::default(), None, &tx);

    assert_eq!(index.page_text(0), Some("Invoice 42 Total due"));
    // Second line starts a new row at y = 20px, i.e. 10 page units.
    assert_eq!(index.word_bbox(0, 2), Some(BoundingBox::new(0.0, 10.0, 8.0, 15.0)));
    assert_eq!(index.word_bbox(0, 3), Some(BoundingBox::new(10.0, 10.0, 18.0, 15.0)));
}

#[test]
fn test_custom_magnification_descales_boxes() {
    let dir = tempdir().unwrap();
    let path = write_document(dir.path(), "scan.pdf");
    let document = load_document(&path, &ScriptedOpener { pages: 1 }).unwrap();
    let ocr = ScriptedOcr::new(&[Some("a b")]);
    let (tx, _rx) = mpsc::unbounded_channel();
    let options = ProcessorOptions { magnification: 4.0 };

    let index = process_document(&document, &ocr, &options, None, &tx);

    assert_eq!(index.word_bbox(0, 1), Some(BoundingBox::new(5.0, 0.0, 9.0, 2.5)));
}

#[test]
fn test_processed_index_is_written_back() {
    let dir = tempdir().unwrap();
    let cache = DocumentCache::new(Some(dir.path().join("cache"))).unwrap();
    let path = write_document(dir.path(), "scan.pdf");
    let document = load_document(&path, &ScriptedOpener { pages: 2 }).unwrap();
    let ocr = ScriptedOcr::new(&[Some("first page"), None]);
    let (tx, _rx) = mpsc::unbounded_channel();

    let index = process_document(&document, &ocr, &ProcessorOptions::default(), Some(&cache), &tx);

    let restored = cache.get_index(document.fingerprint()).unwrap();
    assert_eq!(restored, index);
    assert_eq!(cache.stats().unwrap().total_files, 1);
}

#[test]
fn test_cache_write_failure_is_a_warning() {
    let dir = tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    let cache = DocumentCache::new(Some(cache_dir.clone())).unwrap();
    // Replace the directory with a plain file so every write fails.
    std::fs::remove_dir(&cache_dir).unwrap();
    std::fs::write(&cache_dir, b"not a directory").unwrap();

    let path = write_document(dir.path(), "scan.pdf");
    let document = load_document(&path, &ScriptedOpener { pages: 1 }).unwrap();
    let ocr = ScriptedOcr::new(&[Some("still searchable")]);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let index = process_document(&document, &ocr, &ProcessorOptions::default(), Some(&cache), &tx);

    assert_eq!(index.page_text(0), Some("still searchable"));
    let events = drain(&mut rx);
    assert!(events.iter().any(|event| matches!(
        event,
        ProcessingEvent::Status(message) if message.starts_with("Error saving cache: ")
    )));
    assert_eq!(events.last(), Some(&ProcessingEvent::Status(COMPLETED_STATUS.to_string())));
}

#[tokio::test]
async fn test_background_run_reports_progress_in_page_order() {
    let dir = tempdir().unwrap();
    let path = write_document(dir.path(), "scan.pdf");
    let document = load_document(&path, &ScriptedOpener { pages: 4 }).unwrap();
    let ocr = Arc::new(ScriptedOcr::new(&[Some("a"), Some("b"), None, Some("d")]));

    let handle = spawn_processing(document, ocr.clone(), ProcessorOptions::default(), None);

    let mut events = Vec::new();
    let index = handle.wait_with(|event| events.push(event)).await.unwrap();

    let progress: Vec<(usize, usize)> = events
        .iter()
        .filter_map(|event| match event {
            ProcessingEvent::Progress { completed, total } => Some((*completed, *total)),
            ProcessingEvent::Status(_) => None,
        })
        .collect();
    assert_eq!(progress, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);

    // The failure status for page 3 arrives before page 3's progress.
    let failure = events
        .iter()
        .position(|event| matches!(event, ProcessingEvent::Status(m) if m.starts_with("Error processing page 3")))
        .unwrap();
    let page_three = events
        .iter()
        .position(|event| *event == ProcessingEvent::Progress { completed: 3, total: 4 })
        .unwrap();
    assert!(failure < page_three);

    assert_eq!(index.page_count(), 4);
    assert_eq!(ocr.calls(), 4);
}
