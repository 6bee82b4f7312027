//! Year-over-year contributor statistics.

use chrono::{Datelike, NaiveDate};
use indexmap::IndexMap;

use gitpulse_core::{
    CommitRecord, ContributorRepository, MonthLines, RepositoryLines, YearComparison, YearPair,
};

/// Compare a contributor's activity in two calendar years.
pub fn compare_years(year1: i32, year2: i32, repositories: &[ContributorRepository]) -> YearPair {
    YearPair {
        year1: year_statistics(year1, repositories),
        year2: year_statistics(year2, repositories),
    }
}

/// Summarize commits dated within `year`.
///
/// Month and repository maxima resolve ties in favor of whichever was seen
/// first while walking repositories and their commits in order. A commit whose
/// date is not a valid calendar day still counts toward the totals if its year
/// is readable, but is left out of the monthly breakdown.
pub fn year_statistics(year: i32, repositories: &[ContributorRepository]) -> YearComparison {
    let mut stats = YearComparison::empty(year);
    let mut months: IndexMap<u32, u64> = IndexMap::new();

    for entry in repositories {
        let mut repo_commits = 0usize;
        let mut repo_added = 0u64;

        for commit in &entry.commits {
            let date = CommitDate::parse(&commit.date);
            if date.year != Some(year) {
                if date.year.is_none() {
                    warn_unparseable(commit);
                }
                continue;
            }

            repo_commits += 1;
            repo_added += commit.added();
            stats.commit_count += 1;
            stats.lines_added += commit.added();
            stats.lines_deleted += commit.deleted();

            match date.month {
                Some(month) => *months.entry(month).or_insert(0) += commit.added(),
                None => warn_unparseable(commit),
            }
        }

        if repo_commits == 0 {
            continue;
        }
        stats.repository_count += 1;

        let is_new_max = stats
            .max_added_repository
            .as_ref()
            .is_none_or(|best| repo_added > best.lines);
        if is_new_max {
            stats.max_added_repository = Some(RepositoryLines {
                name: entry.repository.name.clone(),
                path: entry.repository.path.clone(),
                lines: repo_added,
            });
        }
    }

    stats.net_lines = stats.lines_added as i64 - stats.lines_deleted as i64;
    (stats.max_added_month, stats.min_added_month) = month_extremes(&months);

    if stats.commit_count > 0 && months.is_empty() {
        tracing::warn!(
            year,
            commits = stats.commit_count,
            "no commit in year has a usable date for monthly breakdown"
        );
    }
    stats
}

/// The months with the most and fewest added lines, first seen winning ties.
fn month_extremes(months: &IndexMap<u32, u64>) -> (Option<MonthLines>, Option<MonthLines>) {
    let mut max: Option<MonthLines> = None;
    let mut min: Option<MonthLines> = None;

    for (&month, &lines) in months {
        let current = MonthLines { month, lines };
        if max.is_none_or(|m| lines > m.lines) {
            max = Some(current);
        }
        if min.is_none_or(|m| lines < m.lines) {
            min = Some(current);
        }
    }
    (max, min)
}

/// The parts of a commit date that could be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CommitDate {
    year: Option<i32>,
    /// Only set for a valid calendar day.
    month: Option<u32>,
}

impl CommitDate {
    fn parse(date: &str) -> Self {
        if let Ok(day) = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
            return Self {
                year: Some(day.year()),
                month: Some(day.month()),
            };
        }
        Self {
            year: year_prefix(date),
            month: None,
        }
    }
}

/// Read a leading `YYYY-` year.
fn year_prefix(date: &str) -> Option<i32> {
    let bytes = date.trim().as_bytes();
    if bytes.len() < 5 || bytes[4] != b'-' || !bytes[..4].iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(&bytes[..4]).ok()?.parse().ok()
}

fn warn_unparseable(commit: &CommitRecord) {
    tracing::warn!(
        revision = %commit.revision,
        date = %commit.date,
        "invalid commit date"
    );
}
