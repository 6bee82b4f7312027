//! Per-repository analysis results.

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::commit::CommitRecord;
use crate::error::AnalysisFailure;
use crate::repository::RepositoryDescriptor;

/// One author's share of a commit set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorShare {
    pub author: CompactString,
    pub commit_count: usize,
    /// Percentage of the commit set this share was computed from.
    pub percentage: f64,
}

/// Commit count for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub date: CompactString,
    pub commit_count: usize,
}

/// Full commit history and derived statistics for one repository.
///
/// `author_stats` and `daily_stats` each sum to `commits.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryAnalysis {
    pub repository: RepositoryDescriptor,
    /// Newest first, as emitted by the log source.
    pub commits: Vec<CommitRecord>,
    /// Descending by commit count.
    pub author_stats: Vec<AuthorShare>,
    /// Ascending by date.
    pub daily_stats: Vec<DailyActivity>,
    pub last_updated: DateTime<Utc>,
}

impl RepositoryAnalysis {
    /// An analysis with no commits, stamped now.
    pub fn empty(repository: RepositoryDescriptor) -> Self {
        Self {
            repository,
            commits: Vec::new(),
            author_stats: Vec::new(),
            daily_stats: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    /// Number of commits analyzed.
    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }

    /// Check whether the analysis holds no commits.
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// The author with the most commits.
    pub fn top_author(&self) -> Option<&AuthorShare> {
        self.author_stats.first()
    }

    /// The day with the most commits (earliest day wins ties).
    pub fn busiest_day(&self) -> Option<&DailyActivity> {
        self.daily_stats
            .iter()
            .rev()
            .max_by_key(|d| d.commit_count)
    }
}

/// Result of analyzing one repository.
///
/// Analysis never fails outright: when retrieval or parsing goes wrong the
/// analysis is empty and `failure` records why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub analysis: RepositoryAnalysis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<AnalysisFailure>,
}

impl AnalysisOutcome {
    /// A successfully populated analysis.
    pub fn complete(analysis: RepositoryAnalysis) -> Self {
        Self {
            analysis,
            failure: None,
        }
    }

    /// An empty analysis carrying the failure reason.
    pub fn degraded(repository: RepositoryDescriptor, failure: AnalysisFailure) -> Self {
        Self {
            analysis: RepositoryAnalysis::empty(repository),
            failure: Some(failure),
        }
    }

    /// Check whether the analysis was degraded to empty.
    pub fn is_degraded(&self) -> bool {
        self.failure.is_some()
    }

    /// Discard the failure reason.
    pub fn into_analysis(self) -> RepositoryAnalysis {
        self.analysis
    }
}
