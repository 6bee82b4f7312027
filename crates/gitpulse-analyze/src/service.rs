//! Facade combining discovery, analysis and the cache.

use std::path::Path;

use gitpulse_core::{
    AnalysisCache, AnalysisOutcome, CacheEntry, ContributorAnalysis, NoCache, ProgressSink,
    RepositoryDescriptor, ScanConfig, ScanResult,
};
use gitpulse_git::{GitCli, GitTool};
use gitpulse_scan::{describe_repository, RepoScanner};

use crate::contributor::ContributorAnalyzer;
use crate::repository::{run_batch, RepositoryAnalyzer};

/// The operations exposed to front ends.
///
/// Every operation returns a well-formed result; failures are logged and
/// reflected as invalid descriptors, degraded outcomes or skipped entries.
pub struct StatsService<G = GitCli, C = NoCache> {
    scanner: RepoScanner<G>,
    cache: C,
}

impl StatsService<GitCli, NoCache> {
    /// Create a service that runs the system `git` without caching.
    pub fn new() -> Self {
        Self::with_parts(GitCli::new(), NoCache)
    }
}

impl Default for StatsService<GitCli, NoCache> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GitTool, C: AnalysisCache> StatsService<G, C> {
    /// Create a service from a git runner and a cache.
    pub fn with_parts(git: G, cache: C) -> Self {
        Self {
            scanner: RepoScanner::with_git(git),
            cache,
        }
    }

    /// The cache in use.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Find and describe repositories below `config.root`.
    pub fn scan(&self, config: &ScanConfig, sink: Option<&dyn ProgressSink>) -> ScanResult {
        self.scanner.scan_with_progress(config, sink)
    }

    /// Describe a single repository root.
    pub fn describe(&self, path: &Path) -> RepositoryDescriptor {
        describe_repository(self.scanner.git(), path)
    }

    /// Analyze one repository, reusing a cached analysis recorded at its
    /// current head unless `refresh` is set.
    pub fn analyze(&self, repository: &RepositoryDescriptor, refresh: bool) -> AnalysisOutcome {
        if !refresh {
            if let Some(outcome) = self.cached(repository) {
                return outcome;
            }
        }

        let outcome = RepositoryAnalyzer::with_git(self.scanner.git()).analyze(repository);
        self.store(repository, &outcome);
        outcome
    }

    /// Analyze repositories in order, consulting the cache for each.
    ///
    /// `sink` receives `(completed, total)` after each repository.
    pub fn analyze_batch(
        &self,
        repositories: &[RepositoryDescriptor],
        sink: Option<&dyn ProgressSink>,
    ) -> Vec<AnalysisOutcome> {
        run_batch(repositories, sink, |repository| self.analyze(repository, false))
    }

    /// Analyze one author across `repositories`. Never cached.
    pub fn analyze_contributor(
        &self,
        account: &str,
        repositories: &[RepositoryDescriptor],
        years: Option<(i32, i32)>,
    ) -> ContributorAnalysis {
        ContributorAnalyzer::with_git(self.scanner.git()).analyze(account, repositories, years)
    }

    /// Drop the cached analysis for one repository, or all of them.
    pub fn clear_cache(&self, repo_path: Option<&Path>) {
        self.cache.clear(repo_path);
    }

    fn cached(&self, repository: &RepositoryDescriptor) -> Option<AnalysisOutcome> {
        if repository.head_revision.is_empty() {
            return None;
        }
        let entry = self.cache.get(&repository.path)?;
        if entry.last_revision != repository.head_revision {
            tracing::debug!(
                repo = %repository.path.display(),
                cached = %entry.last_revision,
                head = %repository.head_revision,
                "cached analysis is stale"
            );
            return None;
        }

        tracing::debug!(repo = %repository.path.display(), "using cached analysis");
        Some(AnalysisOutcome::complete(entry.analysis))
    }

    fn store(&self, repository: &RepositoryDescriptor, outcome: &AnalysisOutcome) {
        if outcome.is_degraded() || repository.head_revision.is_empty() {
            return;
        }
        self.cache
            .set(&repository.path, &CacheEntry::new(outcome.analysis.clone()));
    }
}
