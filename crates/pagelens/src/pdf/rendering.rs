use super::bindings::bind_pdfium;
use super::error::{PdfError, Result};
use crate::document::PageSource;
use image::DynamicImage;
use pdfium_render::prelude::*;

/// Renders pages of an in-memory PDF.
pub struct PdfRenderer {
    pdfium: Pdfium,
}

impl PdfRenderer {
    pub fn new() -> Result<Self> {
        let binding = bind_pdfium(PdfError::RenderingFailed, "page rendering")?;

        let pdfium = Pdfium::new(binding);
        Ok(Self { pdfium })
    }

    fn load<'a>(&'a self, pdf_bytes: &'a [u8]) -> Result<PdfDocument<'a>> {
        self.pdfium.load_pdf_from_byte_slice(pdf_bytes, None).map_err(|e| {
            let err_msg = e.to_string();
            if err_msg.contains("password") || err_msg.contains("Password") {
                PdfError::PasswordRequired
            } else {
                PdfError::InvalidPdf(err_msg)
            }
        })
    }

    pub fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize> {
        let document = self.load(pdf_bytes)?;
        Ok(document.pages().len() as usize)
    }

    /// Render one page with every dimension multiplied by `magnification`.
    ///
    /// At `magnification = 1.0` one pixel is one PDF point.
    pub fn render_page(&self, pdf_bytes: &[u8], page_index: usize, magnification: f64) -> Result<DynamicImage> {
        let document = self.load(pdf_bytes)?;
        render_document_page(&document, page_index, magnification)
    }
}

fn render_document_page(document: &PdfDocument<'_>, page_index: usize, magnification: f64) -> Result<DynamicImage> {
    let page = document
        .pages()
        .get(page_index as u16)
        .map_err(|_| PdfError::PageNotFound(page_index))?;

    let (width, height) = target_size(page.width().value, page.height().value, magnification);

    let config = PdfRenderConfig::new()
        .set_target_width(width)
        .set_target_height(height)
        .rotate_if_landscape(PdfPageRenderRotation::None, false);

    let bitmap = page
        .render_with_config(&config)
        .map_err(|e| PdfError::RenderingFailed(format!("Failed to render page: {}", e)))?;

    Ok(DynamicImage::ImageRgb8(bitmap.as_image().into_rgb8()))
}

fn target_size(width_points: f32, height_points: f32, magnification: f64) -> (i32, i32) {
    let scale = magnification as f32;
    (
        ((width_points * scale) as i32).max(1),
        ((height_points * scale) as i32).max(1),
    )
}

/// A PDF held in memory, rendered page by page through pdfium.
///
/// Bindings are created per call or per [`render_each`](PageSource::render_each)
/// pass, so the source can move freely to the processing worker.
#[derive(Debug, Clone)]
pub struct PdfPageSource {
    bytes: Vec<u8>,
    page_count: usize,
}

impl PdfPageSource {
    /// Parse `bytes` once to validate them and count pages.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let page_count = PdfRenderer::new()?.page_count(&bytes)?;
        Ok(Self { bytes, page_count })
    }
}

impl PageSource for PdfPageSource {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn render_page(&self, index: usize, magnification: f64) -> crate::Result<DynamicImage> {
        let renderer = PdfRenderer::new()?;
        Ok(renderer.render_page(&self.bytes, index, magnification)?)
    }

    /// Parses the document once for the whole pass.
    fn render_each(&self, magnification: f64, visit: &mut dyn FnMut(usize, crate::Result<DynamicImage>)) {
        let renderer = match PdfRenderer::new() {
            Ok(renderer) => renderer,
            Err(e) => return fail_each(self.page_count, &e, visit),
        };
        let document = match renderer.load(&self.bytes) {
            Ok(document) => document,
            Err(e) => return fail_each(self.page_count, &e, visit),
        };

        for index in 0..self.page_count {
            visit(index, render_document_page(&document, index, magnification).map_err(Into::into));
        }
    }
}

fn fail_each(page_count: usize, error: &PdfError, visit: &mut dyn FnMut(usize, crate::Result<DynamicImage>)) {
    for index in 0..page_count {
        visit(index, Err(error.clone().into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_size_scales_points() {
        assert_eq!(target_size(612.0, 792.0, 2.0), (1224, 1584));
        assert_eq!(target_size(612.0, 792.0, 1.0), (612, 792));
    }

    #[test]
    fn test_target_size_never_zero() {
        assert_eq!(target_size(0.2, 0.0, 2.0), (1, 1));
    }

    #[test]
    fn test_render_each_reports_every_page_when_document_unusable() {
        // Without pdfium the bindings fail; with it the bytes fail to parse.
        let source = PdfPageSource {
            bytes: b"not a pdf".to_vec(),
            page_count: 3,
        };

        let mut visited = Vec::new();
        source.render_each(2.0, &mut |index, result| visited.push((index, result.is_err())));

        assert_eq!(visited, vec![(0, true), (1, true), (2, true)]);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        // Fails with InvalidPdf when pdfium is installed and RenderingFailed when it is not.
        let result = PdfPageSource::from_bytes(b"not a pdf".to_vec());
        assert!(result.is_err());
    }
}
