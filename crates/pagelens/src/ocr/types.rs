use crate::types::{BoundingBox, Point};
use serde::{Deserialize, Serialize};

/// One recognized word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrToken {
    /// Corner points in bitmap pixels, in engine order.
    pub quad: [Point; 4],
    pub text: String,
    pub confidence: f64,
}

/// A line of tokens, left to right.
pub type OcrLine = Vec<OcrToken>;

impl OcrToken {
    pub fn new(quad: [Point; 4], text: impl Into<String>, confidence: f64) -> Self {
        Self {
            quad,
            text: text.into(),
            confidence,
        }
    }

    /// Token from an axis-aligned pixel rectangle.
    pub fn from_rect(left: f64, top: f64, width: f64, height: f64, text: impl Into<String>, confidence: f64) -> Self {
        let right = left + width;
        let bottom = top + height;
        Self::new(
            [
                Point::new(left, top),
                Point::new(right, top),
                Point::new(right, bottom),
                Point::new(left, bottom),
            ],
            text,
            confidence,
        )
    }

    /// Axis-aligned box around the quadrilateral, in bitmap pixels.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::enclosing(&self.quad).unwrap_or_default()
    }
}
