//! Persistent per-document cache of OCR results.
//!
//! Each processed document is stored as one JSON file named after its
//! [`Fingerprint`]. Reads never fail: a missing, truncated or malformed entry is a
//! cache miss. Writes are best-effort and go through a temp file plus rename, so
//! a crashed writer leaves either the old entry or none.
//!
//! There is no eviction and no cross-process locking. Two runs writing the same
//! fingerprint race, and the last rename wins.

use crate::index::{DocumentIndex, PageLocations};
use crate::{PagelensError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Fingerprint format width (32 hex digits, the first 16 bytes of a SHA-256 digest)
const FINGERPRINT_HEX_WIDTH: usize = 32;

const ENTRY_EXTENSION: &str = "json";

/// Stable identifier of one version of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the fingerprint of a document from its path and modification time.
///
/// SHA-256 over the path bytes and the mtime in nanoseconds relative to the Unix
/// epoch. The result is the same across processes and machines.
pub fn fingerprint(path: &Path, modified: SystemTime) -> Fingerprint {
    let nanos: i128 = match modified.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_nanos() as i128,
        Err(before) => -(before.duration().as_nanos() as i128),
    };

    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    hasher.update([0u8]);
    hasher.update(nanos.to_le_bytes());
    let digest = hasher.finalize();

    Fingerprint(hex::encode(&digest[..FINGERPRINT_HEX_WIDTH / 2]))
}

/// On-disk schema of a cache entry.
///
/// Map keys are 0-based integers, written by `serde_json` as strings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CachedDocument {
    pub texts: Vec<String>,
    pub locations: BTreeMap<usize, PageLocations>,
}

impl CachedDocument {
    pub fn from_index(index: &DocumentIndex) -> Self {
        Self {
            texts: index.page_texts().to_vec(),
            locations: index.locations().iter().cloned().enumerate().collect(),
        }
    }

    /// Rebuild an index, or `None` if a location refers to a page past the texts.
    ///
    /// Pages with no location entry get an empty map.
    pub fn into_index(self, fingerprint: Fingerprint) -> Option<DocumentIndex> {
        let page_count = self.texts.len();
        if self.locations.keys().any(|&page| page >= page_count) {
            return None;
        }

        let mut locations = vec![PageLocations::new(); page_count];
        for (page, page_locations) in self.locations {
            locations[page] = page_locations;
        }

        DocumentIndex::from_parts(fingerprint, self.texts, locations).ok()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_files: usize,
    pub total_size_mb: f64,
}

/// Directory of cache entries, one per fingerprint.
#[derive(Debug, Clone)]
pub struct DocumentCache {
    cache_dir: PathBuf,
}

impl DocumentCache {
    /// Open (and create if needed) a cache directory.
    ///
    /// Defaults to `.pagelens/documents` under the current directory.
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self> {
        let cache_dir = match cache_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?.join(".pagelens").join("documents"),
        };

        fs::create_dir_all(&cache_dir)
            .map_err(|e| PagelensError::cache_with_source("Failed to create cache directory", e))?;

        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn entry_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{}", fingerprint.as_str(), ENTRY_EXTENSION))
    }

    /// Look up an entry. Every failure is reported as a miss.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<CachedDocument> {
        let path = self.entry_path(fingerprint);

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(%fingerprint, "Cache miss: {}", e);
                return None;
            }
        };

        match serde_json::from_slice::<CachedDocument>(&bytes) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(%fingerprint, path = %path.display(), "Ignoring unreadable cache entry: {}", e);
                None
            }
        }
    }

    /// Look up an entry and rebuild its index.
    pub fn get_index(&self, fingerprint: &Fingerprint) -> Option<DocumentIndex> {
        let index = self.get(fingerprint)?.into_index(fingerprint.clone());
        if index.is_none() {
            tracing::warn!(%fingerprint, "Ignoring cache entry with locations outside its page range");
        }
        index
    }

    /// Write an entry, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `PagelensError::Cache` when serialization or any filesystem step
    /// fails. Callers treat this as a warning.
    pub fn put(&self, fingerprint: &Fingerprint, texts: &[String], locations: &[PageLocations]) -> Result<()> {
        let entry = CachedDocument {
            texts: texts.to_vec(),
            locations: locations.iter().cloned().enumerate().collect(),
        };
        self.write_entry(fingerprint, &entry)
    }

    pub fn put_index(&self, index: &DocumentIndex) -> Result<()> {
        self.write_entry(index.fingerprint(), &CachedDocument::from_index(index))
    }

    fn write_entry(&self, fingerprint: &Fingerprint, entry: &CachedDocument) -> Result<()> {
        let path = self.entry_path(fingerprint);
        let serialized = serde_json::to_vec(entry)
            .map_err(|e| PagelensError::cache_with_source("Failed to serialize cache entry", e))?;

        let pid = std::process::id();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let temp_path = self
            .cache_dir
            .join(format!("{}.tmp.{}.{}", fingerprint.as_str(), pid, timestamp));

        fs::write(&temp_path, &serialized)
            .map_err(|e| PagelensError::cache_with_source("Failed to write temp cache file", e))?;

        fs::rename(&temp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            PagelensError::cache_with_source("Failed to rename cache file", e)
        })?;

        tracing::debug!(%fingerprint, bytes = serialized.len(), "Wrote cache entry");
        Ok(())
    }

    /// Remove every entry file. Other files in the directory are left alone.
    pub fn clear(&self) -> Result<usize> {
        if !self.cache_dir.exists() {
            return Ok(0);
        }

        let entries = fs::read_dir(&self.cache_dir)
            .map_err(|e| PagelensError::cache_with_source("Failed to read cache directory", e))?;

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !is_entry_file(&path) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => tracing::debug!("Failed to remove {:?}: {}", path, e),
            }
        }

        Ok(removed)
    }

    pub fn stats(&self) -> Result<CacheStats> {
        if !self.cache_dir.exists() {
            return Ok(CacheStats::default());
        }

        let entries = fs::read_dir(&self.cache_dir)
            .map_err(|e| PagelensError::cache_with_source("Failed to read cache directory", e))?;

        let mut total_files = 0;
        let mut total_size_bytes = 0u64;

        for entry in entries.flatten() {
            if !is_entry_file(&entry.path()) {
                continue;
            }
            total_files += 1;
            if let Ok(metadata) = entry.metadata() {
                total_size_bytes += metadata.len();
            }
        }

        Ok(CacheStats {
            total_files,
            total_size_mb: total_size_bytes as f64 / 1024.0 / 1024.0,
        })
    }
}

fn is_entry_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(ENTRY_EXTENSION)
}
