//! Analysis cache port.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::RepositoryAnalysis;

/// A cached analysis, keyed by repository path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub repo_path: PathBuf,
    /// Head revision the analysis was computed at.
    pub last_revision: String,
    pub last_updated: DateTime<Utc>,
    pub analysis: RepositoryAnalysis,
}

impl CacheEntry {
    /// Wrap an analysis, recording its repository's head revision.
    pub fn new(analysis: RepositoryAnalysis) -> Self {
        Self {
            repo_path: analysis.repository.path.clone(),
            last_revision: analysis.repository.head_revision.clone(),
            last_updated: analysis.last_updated,
            analysis,
        }
    }
}

/// Key-value store for repository analyses.
///
/// Implementations swallow their own I/O failures: a read problem is a miss,
/// a write problem is logged and dropped.
pub trait AnalysisCache {
    fn get(&self, repo_path: &Path) -> Option<CacheEntry>;

    fn set(&self, repo_path: &Path, entry: &CacheEntry);

    /// Remove one repository's entry, or every entry when `repo_path` is `None`.
    fn clear(&self, repo_path: Option<&Path>);

    /// True iff an entry exists and was recorded at `head_revision`.
    fn is_valid(&self, repo_path: &Path, head_revision: &str) -> bool {
        self.get(repo_path)
            .is_some_and(|entry| entry.last_revision == head_revision)
    }
}

/// A cache that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl AnalysisCache for NoCache {
    fn get(&self, _repo_path: &Path) -> Option<CacheEntry> {
        None
    }

    fn set(&self, _repo_path: &Path, _entry: &CacheEntry) {}

    fn clear(&self, _repo_path: Option<&Path>) {}
}
