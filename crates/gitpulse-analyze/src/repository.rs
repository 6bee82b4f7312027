//! Per-repository history analysis.

use chrono::Utc;

use gitpulse_core::{
    AnalysisFailure, AnalysisOutcome, ProgressSink, RepositoryAnalysis, RepositoryDescriptor,
};
use gitpulse_git::{queries, GitCli, GitTool};

use crate::stats::{author_distribution, daily_histogram};

/// Retrieves a repository's full history and aggregates it.
pub struct RepositoryAnalyzer<G = GitCli> {
    git: G,
}

impl RepositoryAnalyzer<GitCli> {
    /// Create an analyzer that runs the system `git`.
    pub fn new() -> Self {
        Self::with_git(GitCli::new())
    }
}

impl Default for RepositoryAnalyzer<GitCli> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GitTool> RepositoryAnalyzer<G> {
    /// Create an analyzer using the given git runner.
    pub fn with_git(git: G) -> Self {
        Self { git }
    }

    /// Analyze one repository.
    ///
    /// Never fails: if the tool is unreachable or the history cannot be read,
    /// the outcome holds an empty analysis and the reason.
    pub fn analyze(&self, repository: &RepositoryDescriptor) -> AnalysisOutcome {
        if let Err(err) = self.git.ensure_available() {
            return degrade(repository, err.into());
        }

        let commits = match queries::commit_log(&self.git, &repository.path, None) {
            Ok(commits) => commits,
            Err(err) => return degrade(repository, err.into()),
        };

        let analysis = RepositoryAnalysis {
            repository: repository.clone(),
            author_stats: author_distribution(&commits),
            daily_stats: daily_histogram(&commits),
            commits,
            last_updated: Utc::now(),
        };

        tracing::info!(
            repo = %repository.path.display(),
            commits = analysis.commits.len(),
            authors = analysis.author_stats.len(),
            days = analysis.daily_stats.len(),
            "analyzed repository"
        );
        AnalysisOutcome::complete(analysis)
    }

    /// Analyze repositories one after another, in input order.
    ///
    /// Returns exactly one outcome per input. `sink` receives
    /// `(completed, total)` after each repository.
    pub fn analyze_batch(
        &self,
        repositories: &[RepositoryDescriptor],
        sink: Option<&dyn ProgressSink>,
    ) -> Vec<AnalysisOutcome> {
        run_batch(repositories, sink, |repository| self.analyze(repository))
    }
}

/// Apply `analyze` to each repository sequentially, reporting progress.
pub(crate) fn run_batch<F>(
    repositories: &[RepositoryDescriptor],
    sink: Option<&dyn ProgressSink>,
    mut analyze: F,
) -> Vec<AnalysisOutcome>
where
    F: FnMut(&RepositoryDescriptor) -> AnalysisOutcome,
{
    let total = repositories.len();
    let mut outcomes = Vec::with_capacity(total);

    for (index, repository) in repositories.iter().enumerate() {
        outcomes.push(analyze(repository));
        if let Some(sink) = sink {
            sink.report(index + 1, total);
        }
    }

    let degraded = outcomes.iter().filter(|o| o.is_degraded()).count();
    tracing::info!(repositories = total, degraded, "batch analysis finished");
    outcomes
}

fn degrade(repository: &RepositoryDescriptor, failure: AnalysisFailure) -> AnalysisOutcome {
    tracing::warn!(
        repo = %repository.path.display(),
        kind = %failure.kind,
        "analysis degraded to empty: {}",
        failure.message
    );
    AnalysisOutcome::degraded(repository.clone(), failure)
}
