//! Tesseract backend driven through the `tesseract` command-line tool.

use super::OcrBackend;
use super::tsv_parser::{lines_from_words, parse_tsv_words};
use super::types::OcrLine;
use crate::core::config::OcrConfig;
use crate::{PagelensError, Result};
use image::{DynamicImage, ImageFormat};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

const DEFAULT_BINARY: &str = "tesseract";

/// Runs `tesseract <image> stdout -l <lang> tsv` once per page.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
    language: String,
    min_confidence: f64,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::from_config(&OcrConfig::default())
    }
}

impl TesseractCli {
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            binary: config
                .tesseract_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BINARY)),
            language: config.language.clone(),
            min_confidence: config.min_confidence,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Whether the binary can be started.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn run_tsv(&self, image_path: &Path) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .arg("tsv")
            .output();

        match output {
            Ok(output) if output.status.success() => Ok(String::from_utf8_lossy(&output.stdout).into_owned()),
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(PagelensError::ocr(format!(
                    "tesseract exited with {}: {}",
                    output.status,
                    stderr.trim()
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(PagelensError::MissingDependency(format!(
                "{} not found (install tesseract-ocr)",
                self.binary.display()
            ))),
            Err(e) => Err(PagelensError::ocr_with_source("Failed to start tesseract", e)),
        }
    }
}

impl OcrBackend for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<Vec<OcrLine>> {
        let start = Instant::now();

        let temp = tempfile::Builder::new().prefix("pagelens-").suffix(".png").tempfile()?;
        image
            .save_with_format(temp.path(), ImageFormat::Png)
            .map_err(|e| PagelensError::image_processing_with_source("Failed to encode page bitmap", e))?;

        let tsv = self.run_tsv(temp.path())?;
        let lines = lines_from_words(parse_tsv_words(&tsv, self.min_confidence));

        tracing::debug!(
            language = %self.language,
            lines = lines.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "tesseract finished"
        );

        Ok(lines)
    }
}
