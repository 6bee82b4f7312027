//! Author distribution and daily activity over a commit set.

use std::collections::BTreeMap;

use compact_str::CompactString;
use indexmap::IndexMap;

use gitpulse_core::{AuthorShare, CommitRecord, DailyActivity};

/// Group commits by author, most active first.
///
/// Authors with equal counts keep the order in which they first appear.
/// Percentages are relative to the number of commits given, and the counts
/// always sum to that number.
pub fn author_distribution<'a, I>(commits: I) -> Vec<AuthorShare>
where
    I: IntoIterator<Item = &'a CommitRecord>,
{
    let mut counts: IndexMap<&CompactString, usize> = IndexMap::new();
    let mut total = 0usize;
    for commit in commits {
        *counts.entry(&commit.author).or_insert(0) += 1;
        total += 1;
    }

    let mut shares: Vec<AuthorShare> = counts
        .into_iter()
        .map(|(author, commit_count)| AuthorShare {
            author: author.clone(),
            commit_count,
            percentage: percentage(commit_count, total),
        })
        .collect();

    // Stable, so ties stay in first-seen order
    shares.sort_by(|a, b| b.commit_count.cmp(&a.commit_count));
    shares
}

/// Count commits per calendar day, earliest day first.
pub fn daily_histogram<'a, I>(commits: I) -> Vec<DailyActivity>
where
    I: IntoIterator<Item = &'a CommitRecord>,
{
    let mut days: BTreeMap<&CompactString, usize> = BTreeMap::new();
    for commit in commits {
        *days.entry(&commit.date).or_insert(0) += 1;
    }

    days.into_iter()
        .map(|(date, commit_count)| DailyActivity {
            date: date.clone(),
            commit_count,
        })
        .collect()
}

/// `part / whole * 100`, or 0 for an empty whole.
pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
