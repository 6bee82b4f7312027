//! Cross-repository contributor reports.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::DailyActivity;
use crate::commit::CommitRecord;
use crate::repository::RepositoryDescriptor;

/// Added-line total for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthLines {
    /// 1 through 12.
    pub month: u32,
    pub lines: u64,
}

/// Added-line total for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryLines {
    pub name: String,
    pub path: PathBuf,
    pub lines: u64,
}

/// One contributor's activity within a calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearComparison {
    pub year: i32,
    pub commit_count: usize,
    pub lines_added: u64,
    pub lines_deleted: u64,
    /// `lines_added - lines_deleted`.
    pub net_lines: i64,
    pub max_added_month: Option<MonthLines>,
    pub min_added_month: Option<MonthLines>,
    /// Repositories with at least one commit in the year.
    pub repository_count: usize,
    pub max_added_repository: Option<RepositoryLines>,
}

impl YearComparison {
    /// A year with no activity.
    pub fn empty(year: i32) -> Self {
        Self {
            year,
            commit_count: 0,
            lines_added: 0,
            lines_deleted: 0,
            net_lines: 0,
            max_added_month: None,
            min_added_month: None,
            repository_count: 0,
            max_added_repository: None,
        }
    }
}

/// The two years being compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearPair {
    pub year1: YearComparison,
    pub year2: YearComparison,
}

impl YearPair {
    /// Change in commit count from `year1` to `year2`.
    pub fn commit_delta(&self) -> i64 {
        self.year2.commit_count as i64 - self.year1.commit_count as i64
    }

    /// Change in net lines from `year1` to `year2`.
    pub fn net_lines_delta(&self) -> i64 {
        self.year2.net_lines - self.year1.net_lines
    }
}

/// A contributor's commits within one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorRepository {
    pub repository: RepositoryDescriptor,
    pub commit_count: usize,
    /// Share of the repository's total history.
    pub percentage: f64,
    /// Commits with line statistics, newest first.
    pub commits: Vec<CommitRecord>,
}

/// A contributor's activity across a set of repositories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorAnalysis {
    pub account: String,
    pub total_commits: usize,
    /// Only repositories where the account has at least one commit.
    pub repositories: Vec<ContributorRepository>,
    pub daily_stats: Vec<DailyActivity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_comparison: Option<YearPair>,
    pub last_updated: DateTime<Utc>,
}

impl ContributorAnalysis {
    /// Total lines added across all repositories.
    pub fn total_lines_added(&self) -> u64 {
        self.commits().map(CommitRecord::added).sum()
    }

    /// Total lines deleted across all repositories.
    pub fn total_lines_deleted(&self) -> u64 {
        self.commits().map(CommitRecord::deleted).sum()
    }

    /// All commits, repository by repository.
    pub fn commits(&self) -> impl Iterator<Item = &CommitRecord> {
        self.repositories.iter().flat_map(|r| r.commits.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_pair_deltas() {
        let mut year1 = YearComparison::empty(2023);
        year1.commit_count = 4;
        year1.net_lines = 100;
        let mut year2 = YearComparison::empty(2024);
        year2.commit_count = 10;
        year2.net_lines = 40;

        let pair = YearPair { year1, year2 };
        assert_eq!(pair.commit_delta(), 6);
        assert_eq!(pair.net_lines_delta(), -60);
    }
}
