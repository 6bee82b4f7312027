//! Repository discovery.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use tokio::sync::broadcast;

use gitpulse_core::{
    ProgressSink, ScanConfig, ScanProgress, ScanResult, ScanWarning, WarningKind,
};
use gitpulse_git::{GitCli, GitTool};

use crate::metadata::describe_repository;
use crate::walk::enumerate_directories;

/// Finds repository roots below a directory and describes each one.
pub struct RepoScanner<G = GitCli> {
    git: G,
    progress_tx: broadcast::Sender<ScanProgress>,
}

impl RepoScanner<GitCli> {
    /// Create a scanner that runs the system `git`.
    pub fn new() -> Self {
        Self::with_git(GitCli::new())
    }
}

impl Default for RepoScanner<GitCli> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GitTool> RepoScanner<G> {
    /// Create a scanner using the given git runner.
    pub fn with_git(git: G) -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self { git, progress_tx }
    }

    /// The git runner in use.
    pub fn git(&self) -> &G {
        &self.git
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Scan `config.root` for repositories.
    pub fn scan(&self, config: &ScanConfig) -> ScanResult {
        self.scan_with_progress(config, None)
    }

    /// Scan `config.root`, reporting `(processed, total)` directories to `sink`.
    ///
    /// A root that does not exist or is not a directory yields an empty result
    /// with a warning. Unreadable subdirectories are recorded as warnings and
    /// skipped. Repositories whose metadata cannot be read are included as
    /// invalid descriptors.
    pub fn scan_with_progress(
        &self,
        config: &ScanConfig,
        sink: Option<&dyn ProgressSink>,
    ) -> ScanResult {
        let start = Instant::now();
        let root = config.root.clone();

        if !root.is_dir() {
            let message = if root.exists() {
                "scan root is not a directory"
            } else {
                "scan root does not exist"
            };
            tracing::warn!(root = %root.display(), "{message}");
            let mut result = ScanResult::empty(&root, elapsed_ms(start));
            result
                .warnings
                .push(ScanWarning::new(&root, message, WarningKind::ReadError));
            return result;
        }

        let walk = enumerate_directories(config, &root);
        let total = walk.dirs.len();
        tracing::info!(
            root = %root.display(),
            directories = total,
            max_depth = config.max_depth,
            "scanning for repositories"
        );

        let mut progress = ScanProgress::new(total as u64);
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut repositories = Vec::new();

        for (index, dir) in walk.dirs.iter().enumerate() {
            if dir.is_repository_root && seen.insert(dir.path.clone()) {
                repositories.push(describe_repository(&self.git, &dir.path));
                progress.repositories_found += 1;
            }

            progress.dirs_visited = index as u64 + 1;
            progress.current_path = dir.path.clone();
            progress.elapsed = start.elapsed();
            // No subscribers is fine
            let _ = self.progress_tx.send(progress.clone());

            if let Some(sink) = sink {
                sink.report(index + 1, total);
            }
        }

        let result = ScanResult::new(root, repositories, elapsed_ms(start), walk.warnings);
        tracing::info!(
            found = result.total_scanned,
            valid = result.total_valid,
            warnings = result.warnings.len(),
            elapsed_ms = result.scan_time_ms,
            "scan finished"
        );
        result
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
