//! Mapping stored word boxes onto a rendered page.
//!
//! Boxes in the index are in page units (descaled by the raster magnification
//! `M`). A viewer that shows the page at zoom `Z` renders it at `M * Z` and must
//! scale every box coordinate by the same factor.

use crate::core::config::RASTER_MAGNIFICATION;
use crate::types::BoundingBox;

pub const MIN_ZOOM: f64 = 0.4;
pub const MAX_ZOOM: f64 = 3.0;
pub const ZOOM_STEP: f64 = 0.2;

/// User-controlled viewer zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLevel(f64);

impl Default for ZoomLevel {
    fn default() -> Self {
        Self(1.0)
    }
}

impl ZoomLevel {
    /// Clamp `value` to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(round_step(value.clamp(MIN_ZOOM, MAX_ZOOM)))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn zoom_in(self) -> Self {
        Self::new(self.0 + ZOOM_STEP)
    }

    pub fn zoom_out(self) -> Self {
        Self::new(self.0 - ZOOM_STEP)
    }
}

// Repeated 0.2 steps drift in binary floating point; keep one decimal.
fn round_step(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Page units to screen pixels for one rendering of a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightTransform {
    pub magnification: f64,
    pub zoom: ZoomLevel,
}

impl Default for HighlightTransform {
    fn default() -> Self {
        Self {
            magnification: RASTER_MAGNIFICATION,
            zoom: ZoomLevel::default(),
        }
    }
}

impl HighlightTransform {
    pub fn new(magnification: f64, zoom: ZoomLevel) -> Self {
        Self { magnification, zoom }
    }

    /// `M * Z`, the factor the page bitmap is rendered at.
    pub fn scale(&self) -> f64 {
        self.magnification * self.zoom.value()
    }

    pub fn to_screen(&self, bbox: BoundingBox) -> BoundingBox {
        bbox.scale(self.scale())
    }

    /// Inverse of [`to_screen`](Self::to_screen).
    pub fn to_page(&self, rect: BoundingBox) -> BoundingBox {
        rect.descale(self.scale())
    }
}
