//! Repository descriptors and scan results.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::ScanWarning;

/// Metadata for one discovered repository root.
///
/// The path is the identity key. Descriptors for repositories whose metadata
/// could not be extracted are still produced, with `is_valid == false` and the
/// reason in `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    /// Final path component of the root.
    pub name: String,
    /// Repository root.
    pub path: PathBuf,
    /// Checked-out branch (`HEAD` when detached).
    pub current_branch: String,
    /// Head revision id.
    pub head_revision: String,
    /// Committer date of the head revision, `YYYY-MM-DD`.
    pub head_date: String,
    /// Number of commits reachable from head.
    pub total_commits: u64,
    /// Distinct author names, in first-seen order of the log.
    pub authors: IndexSet<String>,
    /// Whether metadata extraction succeeded.
    pub is_valid: bool,
    /// Extraction failure, when `is_valid` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RepositoryDescriptor {
    /// Create a descriptor for a root whose metadata could not be extracted.
    pub fn invalid(path: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: repository_name(&path),
            path,
            current_branch: String::new(),
            head_revision: String::new(),
            head_date: String::new(),
            total_commits: 0,
            authors: IndexSet::new(),
            is_valid: false,
            error: Some(error.into()),
        }
    }

    /// Create a valid descriptor with empty metadata, to be filled by the caller.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: repository_name(&path),
            path,
            current_branch: String::new(),
            head_revision: String::new(),
            head_date: String::new(),
            total_commits: 0,
            authors: IndexSet::new(),
            is_valid: true,
            error: None,
        }
    }
}

/// Display name of a repository: the last path component, or the whole path.
pub(crate) fn repository_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Result of scanning a directory tree for repositories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Root that was scanned.
    pub root_path: PathBuf,
    /// Discovered repositories, in depth-first discovery order.
    pub repositories: Vec<RepositoryDescriptor>,
    /// Number of repository roots found.
    pub total_scanned: usize,
    /// Number of roots whose metadata was extracted successfully.
    pub total_valid: usize,
    /// Wall-clock scan time in milliseconds.
    pub scan_time_ms: u64,
    /// Directories that could not be listed.
    #[serde(default)]
    pub warnings: Vec<ScanWarning>,
}

impl ScanResult {
    /// Build a result, deriving the totals from the repository list.
    pub fn new(
        root_path: impl Into<PathBuf>,
        repositories: Vec<RepositoryDescriptor>,
        scan_time_ms: u64,
        warnings: Vec<ScanWarning>,
    ) -> Self {
        let total_valid = repositories.iter().filter(|r| r.is_valid).count();
        Self {
            root_path: root_path.into(),
            total_scanned: repositories.len(),
            total_valid,
            repositories,
            scan_time_ms,
            warnings,
        }
    }

    /// An empty result for a root that could not be scanned.
    pub fn empty(root_path: impl Into<PathBuf>, scan_time_ms: u64) -> Self {
        Self::new(root_path, Vec::new(), scan_time_ms, Vec::new())
    }

    /// Iterate over the valid repositories only.
    pub fn valid_repositories(&self) -> impl Iterator<Item = &RepositoryDescriptor> {
        self.repositories.iter().filter(|r| r.is_valid)
    }
}
