//! Repository discovery for gitpulse.
//!
//! This crate walks a directory tree with jwalk, finds every directory that
//! holds a `.git` metadata directory, and describes each root through the
//! git runner.
//!
//! # Overview
//!
//! - **Depth-bounded** serial traversal (root is depth 0, default limit 3)
//! - **Pruning** of dependency/build folders and of the metadata directory
//! - **Progress updates** via a broadcast channel or a [`ProgressSink`]
//! - **Graceful** handling of unreadable directories and broken repositories
//!
//! # Example
//!
//! ```rust,no_run
//! use gitpulse_scan::{RepoScanner, ScanConfig};
//!
//! let scanner = RepoScanner::new();
//! let result = scanner.scan(&ScanConfig::new("/path/to/projects"));
//!
//! for repo in result.valid_repositories() {
//!     println!("{} ({} commits)", repo.name, repo.total_commits);
//! }
//! ```

mod metadata;
mod scanner;
mod walk;

pub use metadata::describe_repository;
pub use scanner::RepoScanner;
pub use walk::{enumerate_directories, DirectoryWalk, VisitedDir};

// Re-export core types for convenience
pub use gitpulse_core::{
    ProgressSink, RepositoryDescriptor, ScanConfig, ScanProgress, ScanResult, ScanWarning,
    WarningKind,
};
