//! Cross-repository analysis of a single author.

use chrono::Utc;

use gitpulse_core::{
    CommitRecord, ContributorAnalysis, ContributorRepository, LineStats, RepositoryDescriptor,
};
use gitpulse_git::{queries, GitCli, GitTool};

use crate::stats::{daily_histogram, percentage};
use crate::yearly::compare_years;

/// Collects one author's commits, with line statistics, across repositories.
pub struct ContributorAnalyzer<G = GitCli> {
    git: G,
}

impl ContributorAnalyzer<GitCli> {
    /// Create an analyzer that runs the system `git`.
    pub fn new() -> Self {
        Self::with_git(GitCli::new())
    }
}

impl Default for ContributorAnalyzer<GitCli> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GitTool> ContributorAnalyzer<G> {
    /// Create an analyzer using the given git runner.
    pub fn with_git(git: G) -> Self {
        Self { git }
    }

    /// Analyze `account` across `repositories`.
    ///
    /// Invalid repositories are skipped, as are repositories whose log cannot
    /// be read. `years`, when given, adds a comparison of the two calendar
    /// years.
    pub fn analyze(
        &self,
        account: &str,
        repositories: &[RepositoryDescriptor],
        years: Option<(i32, i32)>,
    ) -> ContributorAnalysis {
        let mut found = Vec::new();

        match self.git.ensure_available() {
            Ok(()) => {
                for repository in repositories.iter().filter(|r| r.is_valid) {
                    if let Some(entry) = self.analyze_repository(account, repository) {
                        found.push(entry);
                    }
                }
            }
            Err(err) => {
                tracing::warn!(account, error = %err, "cannot analyze contributor");
            }
        }

        let total_commits = found.iter().map(|r| r.commit_count).sum();
        let daily_stats = daily_histogram(found.iter().flat_map(|r| r.commits.iter()));
        let year_comparison = years.map(|(year1, year2)| compare_years(year1, year2, &found));

        tracing::info!(
            account,
            repositories = found.len(),
            commits = total_commits,
            "analyzed contributor"
        );

        ContributorAnalysis {
            account: account.to_string(),
            total_commits,
            repositories: found,
            daily_stats,
            year_comparison,
            last_updated: Utc::now(),
        }
    }

    /// The account's commits in one repository, or `None` if it has none there.
    fn analyze_repository(
        &self,
        account: &str,
        repository: &RepositoryDescriptor,
    ) -> Option<ContributorRepository> {
        let commits = match queries::commit_log(&self.git, &repository.path, Some(account)) {
            Ok(commits) => commits,
            Err(err) => {
                tracing::warn!(
                    repo = %repository.path.display(),
                    account,
                    error = %err,
                    "skipping repository in contributor analysis"
                );
                return None;
            }
        };

        // The tool's author filter also matches partial names
        let commits: Vec<CommitRecord> = commits
            .into_iter()
            .filter(|commit| commit.author == account)
            .map(|commit| {
                let stats = self.line_stats(repository, &commit);
                commit.with_line_stats(stats)
            })
            .collect();

        if commits.is_empty() {
            return None;
        }

        let commit_count = commits.len();
        let whole = match repository.total_commits {
            0 => commit_count,
            total => usize::try_from(total).unwrap_or(usize::MAX),
        };

        Some(ContributorRepository {
            repository: repository.clone(),
            commit_count,
            percentage: percentage(commit_count, whole),
            commits,
        })
    }

    fn line_stats(&self, repository: &RepositoryDescriptor, commit: &CommitRecord) -> LineStats {
        queries::line_stats(&self.git, &repository.path, &commit.revision).unwrap_or_else(|err| {
            tracing::warn!(
                repo = %repository.path.display(),
                revision = %commit.revision,
                error = %err,
                "line statistics unavailable, counting as zero"
            );
            LineStats::default()
        })
    }
}
