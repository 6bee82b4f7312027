//! File-backed analysis cache for gitpulse.
//!
//! Each repository's analysis is stored as a pretty-printed JSON file in one
//! directory, named by the BLAKE3 digest of the repository path. Entries are
//! valid only while the repository's head revision is unchanged.
//!
//! ```rust,no_run
//! use gitpulse_cache::JsonFileCache;
//! use gitpulse_core::AnalysisCache;
//! use std::path::Path;
//!
//! let cache = JsonFileCache::new(JsonFileCache::default_dir());
//! if cache.is_valid(Path::new("/src/app"), "4f2c9e1") {
//!     let entry = cache.get(Path::new("/src/app")).unwrap();
//!     println!("{} commits", entry.analysis.commit_count());
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use gitpulse_core::{AnalysisCache, CacheEntry};

const ENTRY_EXTENSION: &str = "json";

/// Where cached analyses are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding one file per repository.
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: JsonFileCache::default_dir(),
        }
    }
}

/// [`AnalysisCache`] storing one JSON file per repository.
///
/// I/O and decoding problems never reach the caller: reads degrade to a miss
/// and failed writes or removals are logged.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    dir: PathBuf,
}

impl JsonFileCache {
    /// Create a cache rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create a cache from configuration.
    pub fn with_config(config: &CacheConfig) -> Self {
        Self::new(&config.dir)
    }

    /// The platform cache directory, or `./.gitpulse-cache` when there is none.
    pub fn default_dir() -> PathBuf {
        dirs::cache_dir()
            .map(|d| d.join("gitpulse").join("analysis"))
            .unwrap_or_else(|| PathBuf::from(".gitpulse-cache"))
    }

    /// The directory entries are stored in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the entry for `repo_path`.
    pub fn entry_path(&self, repo_path: &Path) -> PathBuf {
        let digest = blake3::hash(repo_path.as_os_str().as_encoded_bytes());
        self.dir
            .join(digest.to_hex().as_str())
            .with_extension(ENTRY_EXTENSION)
    }

    fn read(&self, repo_path: &Path) -> io::Result<Option<CacheEntry>> {
        let path = self.entry_path(repo_path);
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };

        let entry: CacheEntry = serde_json::from_slice(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        // A digest collision or a hand-copied file
        if entry.repo_path != repo_path {
            return Ok(None);
        }
        Ok(Some(entry))
    }

    fn write(&self, repo_path: &Path, entry: &CacheEntry) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_vec_pretty(entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(self.entry_path(repo_path), content)
    }

    fn remove_all(&self) -> io::Result<usize> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err),
        };

        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            let is_entry = path.is_file()
                && path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION);
            if is_entry {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

impl Default for JsonFileCache {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

impl AnalysisCache for JsonFileCache {
    fn get(&self, repo_path: &Path) -> Option<CacheEntry> {
        match self.read(repo_path) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(repo = %repo_path.display(), error = %err, "unreadable cache entry");
                None
            }
        }
    }

    fn set(&self, repo_path: &Path, entry: &CacheEntry) {
        match self.write(repo_path, entry) {
            Ok(()) => tracing::debug!(repo = %repo_path.display(), "cached analysis"),
            Err(err) => {
                tracing::warn!(
                    repo = %repo_path.display(),
                    error = %err,
                    "failed to write cache entry"
                );
            }
        }
    }

    fn clear(&self, repo_path: Option<&Path>) {
        let Some(repo_path) = repo_path else {
            match self.remove_all() {
                Ok(removed) => tracing::info!(dir = %self.dir.display(), removed, "cleared cache"),
                Err(err) => {
                    tracing::warn!(
                        dir = %self.dir.display(),
                        error = %err,
                        "failed to clear cache"
                    );
                }
            }
            return;
        };

        match fs::remove_file(self.entry_path(repo_path)) {
            Ok(()) => tracing::info!(repo = %repo_path.display(), "cleared cache entry"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(
                    repo = %repo_path.display(),
                    error = %err,
                    "failed to clear cache entry"
                );
            }
        }
    }
}
