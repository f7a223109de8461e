use super::error::PdfError;
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;
use std::sync::Mutex;

/// Outcome of the first attempt to bind the system pdfium library.
enum InitializationState {
    Uninitialized,
    Initialized,
    /// Binding failed with this message; later calls fail fast.
    Failed(String),
}

/// Pdfium is bound at most once per process, on first use.
///
/// Only the outcome is cached. `Box<dyn PdfiumLibraryBindings>` is not `Clone`, so
/// each caller receives fresh bindings created after the first success.
static PDFIUM_STATE: Lazy<Mutex<InitializationState>> = Lazy::new(|| Mutex::new(InitializationState::Uninitialized));

/// Get pdfium bindings, initializing lazily.
///
/// # Arguments
///
/// * `map_err` - Maps error strings to a `PdfError` variant
/// * `context` - What the bindings are for, included in error messages
pub(crate) fn bind_pdfium(
    map_err: fn(String) -> PdfError,
    context: &'static str,
) -> Result<Box<dyn PdfiumLibraryBindings>, PdfError> {
    let mut state = PDFIUM_STATE
        .lock()
        .map_err(|e| map_err(format!("Failed to acquire lock on Pdfium state ({}): {}", context, e)))?;

    match &*state {
        InitializationState::Uninitialized => match Pdfium::bind_to_system_library() {
            Ok(bindings) => {
                *state = InitializationState::Initialized;
                tracing::debug!(context, "Pdfium bound to system library");
                return Ok(bindings);
            }
            Err(e) => {
                let err = e.to_string();
                *state = InitializationState::Failed(err.clone());
                return Err(map_err(format!("Pdfium initialization failed ({}): {}", context, err)));
            }
        },
        InitializationState::Failed(err) => {
            return Err(map_err(format!(
                "Pdfium initialization previously failed ({}): {}",
                context, err
            )));
        }
        InitializationState::Initialized => {}
    }

    Pdfium::bind_to_system_library()
        .map_err(|e| map_err(format!("Failed to create Pdfium bindings ({}): {}", context, e)))
}
