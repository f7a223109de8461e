//! Configuration loading and management.
//!
//! Configuration can be loaded from TOML, YAML or JSON files, discovered as
//! `pagelens.toml` in the current directory or any parent, or built in code.

use crate::{PagelensError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Magnification at which pages are rasterized for OCR.
///
/// Stored bounding boxes are divided by this factor. A viewer drawing highlights
/// over a page rendered at zoom `Z` must multiply them by `RASTER_MAGNIFICATION * Z`.
pub const RASTER_MAGNIFICATION: f64 = 2.0;

/// Characters of context kept on each side of a search match.
pub const CONTEXT_RADIUS: usize = 50;

pub const CONFIG_FILE_NAME: &str = "pagelens.toml";

/// Main configuration.
///
/// # Example
///
/// ```rust
/// use pagelens::core::config::PagelensConfig;
///
/// let config = PagelensConfig::default();
/// assert!(config.use_cache);
/// assert_eq!(config.magnification, 2.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagelensConfig {
    /// Read and write the per-document cache
    #[serde(default = "default_true")]
    pub use_cache: bool,

    /// Cache directory (None = `.pagelens/documents` under the current directory)
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Rasterization magnification used when processing
    #[serde(default = "default_magnification")]
    pub magnification: f64,

    /// Characters of context on each side of a match
    #[serde(default = "default_context_radius")]
    pub context_radius: usize,

    /// OCR engine settings
    #[serde(default)]
    pub ocr: OcrConfig,
}

/// OCR configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Tesseract language code(s), e.g. "eng" or "deu+eng"
    #[serde(default = "default_eng")]
    pub language: String,

    /// Explicit path to the tesseract binary (None = look it up on PATH)
    #[serde(default)]
    pub tesseract_path: Option<PathBuf>,

    /// Words below this confidence (0-100) are dropped
    #[serde(default)]
    pub min_confidence: f64,
}

fn default_true() -> bool {
    true
}
fn default_eng() -> String {
    "eng".to_string()
}
fn default_magnification() -> f64 {
    RASTER_MAGNIFICATION
}
fn default_context_radius() -> usize {
    CONTEXT_RADIUS
}

impl Default for PagelensConfig {
    fn default() -> Self {
        Self {
            use_cache: true,
            cache_dir: None,
            magnification: RASTER_MAGNIFICATION,
            context_radius: CONTEXT_RADIUS,
            ocr: OcrConfig::default(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: default_eng(),
            tesseract_path: None,
            min_confidence: 0.0,
        }
    }
}

impl PagelensConfig {
    /// Check values that would break processing.
    ///
    /// # Errors
    ///
    /// Returns `PagelensError::Validation` for a non-positive or non-finite
    /// magnification, or an empty OCR language.
    pub fn validate(&self) -> Result<()> {
        if !self.magnification.is_finite() || self.magnification <= 0.0 {
            return Err(PagelensError::validation(format!(
                "magnification must be a positive number, got {}",
                self.magnification
            )));
        }

        if self.ocr.language.trim().is_empty() {
            return Err(PagelensError::validation(
                "OCR language cannot be empty (e.g. 'eng')",
            ));
        }

        Ok(())
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `PagelensError::Validation` if the file can't be read, isn't valid
    /// TOML, or fails [`validate`](Self::validate).
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| PagelensError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_yaml_ng::from_str(&content)
            .map_err(|e| PagelensError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| PagelensError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a file, picking the format from its extension (TOML by default).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Discover `pagelens.toml` in the current directory or a parent.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file exists up to the filesystem root
    pub fn discover() -> Result<Option<Self>> {
        let current = std::env::current_dir().map_err(PagelensError::Io)?;
        Self::discover_from(&current)
    }

    /// Discover `pagelens.toml` starting at `start`.
    pub fn discover_from(start: &Path) -> Result<Option<Self>> {
        for dir in start.ancestors() {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "Using discovered config");
                return Ok(Some(Self::from_toml_file(candidate)?));
            }
        }

        Ok(None)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| PagelensError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = PagelensConfig::default();
        assert!(config.use_cache);
        assert!(config.cache_dir.is_none());
        assert_eq!(config.magnification, RASTER_MAGNIFICATION);
        assert_eq!(config.context_radius, 50);
        assert_eq!(config.ocr.language, "eng");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("pagelens.toml");

        fs::write(
            &config_path,
            r#"
use_cache = false
cache_dir = "/var/cache/pagelens"
context_radius = 20

[ocr]
language = "deu"
min_confidence = 35.5
        "#,
        )
        .unwrap();

        let config = PagelensConfig::from_toml_file(&config_path).unwrap();
        assert!(!config.use_cache);
        assert_eq!(config.cache_dir, Some(PathBuf::from("/var/cache/pagelens")));
        assert_eq!(config.magnification, RASTER_MAGNIFICATION);
        assert_eq!(config.context_radius, 20);
        assert_eq!(config.ocr.language, "deu");
        assert_eq!(config.ocr.min_confidence, 35.5);
        assert!(config.ocr.tesseract_path.is_none());
    }

    #[test]
    fn test_from_yaml_and_json() {
        let dir = tempdir().unwrap();

        let yaml_path = dir.path().join("pagelens.yaml");
        fs::write(&yaml_path, "magnification: 3.0\nocr:\n  language: fra\n").unwrap();
        let yaml = PagelensConfig::from_file(&yaml_path).unwrap();
        assert_eq!(yaml.magnification, 3.0);
        assert_eq!(yaml.ocr.language, "fra");

        let json_path = dir.path().join("pagelens.json");
        fs::write(&json_path, r#"{"use_cache": false}"#).unwrap();
        let json = PagelensConfig::from_file(&json_path).unwrap();
        assert!(!json.use_cache);
        assert_eq!(json.ocr.language, "eng");
    }

    #[test]
    fn test_invalid_toml_is_validation_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("pagelens.toml");
        fs::write(&config_path, "use_cache = \"maybe\"").unwrap();

        let err = PagelensConfig::from_toml_file(&config_path).unwrap_err();
        assert!(matches!(err, PagelensError::Validation { .. }));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_missing_file_is_validation_error() {
        let err = PagelensConfig::from_toml_file("/nonexistent/pagelens.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_validate_rejects_bad_magnification() {
        for magnification in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            let config = PagelensConfig {
                magnification,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "accepted {}", magnification);
        }
    }

    #[test]
    fn test_validate_rejects_empty_language() {
        let config = PagelensConfig {
            ocr: OcrConfig {
                language: "  ".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_discover_from_parent_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "context_radius = 10\n").unwrap();
        let nested = dir.path().join("scans").join("2024");
        fs::create_dir_all(&nested).unwrap();

        let config = PagelensConfig::discover_from(&nested).unwrap().unwrap();
        assert_eq!(config.context_radius, 10);
    }

    #[test]
    fn test_discover_none() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("empty");
        fs::create_dir_all(&nested).unwrap();

        // A pagelens.toml above the temp dir would be picked up, so only assert
        // that discovery does not fail.
        assert!(PagelensConfig::discover_from(&nested).is_ok());
    }
}
