//! Typed repository queries built on a [`GitTool`].

use std::path::Path;

use indexmap::IndexSet;

use gitpulse_core::{CommitRecord, GitError, LineStats};

use crate::parser::{parse_log, parse_numstat, LOG_FORMAT};
use crate::tool::{GitTool, OutputBudget};

/// Check whether `repo` is inside a repository the tool recognizes.
pub fn is_repository<T: GitTool + ?Sized>(git: &T, repo: &Path) -> Result<bool, GitError> {
    match git.run(repo, &["rev-parse", "--git-dir"], OutputBudget::History) {
        Ok(_) => Ok(true),
        Err(GitError::CommandFailed { .. }) => Ok(false),
        Err(err) => Err(err),
    }
}

/// Name of the checked-out branch (`HEAD` when detached).
pub fn current_branch<T: GitTool + ?Sized>(git: &T, repo: &Path) -> Result<String, GitError> {
    single_line(git, repo, &["rev-parse", "--abbrev-ref", "HEAD"])
}

/// Full id of the head revision.
pub fn head_revision<T: GitTool + ?Sized>(git: &T, repo: &Path) -> Result<String, GitError> {
    single_line(git, repo, &["rev-parse", "HEAD"])
}

/// Committer date of the head revision, `YYYY-MM-DD`.
pub fn head_date<T: GitTool + ?Sized>(git: &T, repo: &Path) -> Result<String, GitError> {
    single_line(git, repo, &["log", "-1", "--format=%cd", "--date=short"])
}

/// Number of commits reachable from head.
pub fn commit_count<T: GitTool + ?Sized>(git: &T, repo: &Path) -> Result<u64, GitError> {
    let args = ["rev-list", "--count", "HEAD"];
    let value = single_line(git, repo, &args)?;
    value.parse().map_err(|_| GitError::InvalidOutput {
        args: args.join(" "),
        message: format!("expected a commit count, got {value:?}"),
    })
}

/// Distinct author names across all history, in log order.
pub fn authors<T: GitTool + ?Sized>(git: &T, repo: &Path) -> Result<IndexSet<String>, GitError> {
    let output = git.run(repo, &["log", "--format=%an"], OutputBudget::History)?;
    Ok(output
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(String::from)
        .collect())
}

/// Full commit history, newest first, optionally limited to one author.
///
/// The author filter is applied by the tool as a literal substring match, so
/// callers wanting an exact identity should also compare `CommitRecord::author`.
pub fn commit_log<T: GitTool + ?Sized>(
    git: &T,
    repo: &Path,
    author: Option<&str>,
) -> Result<Vec<CommitRecord>, GitError> {
    let pretty = format!("--pretty=format:{LOG_FORMAT}");
    let author_filter = author.map(|author| format!("--author={author}"));

    let mut args = vec!["log", pretty.as_str(), "--date=short"];
    if let Some(filter) = author_filter.as_deref() {
        args.push("--fixed-strings");
        args.push(filter);
    }

    let output = git.run(repo, &args, OutputBudget::History)?;
    let commits = parse_log(&output);
    tracing::debug!(
        repo = %repo.display(),
        bytes = output.len(),
        commits = commits.len(),
        "parsed commit log"
    );
    Ok(commits)
}

/// Added/deleted line totals for a single revision.
pub fn line_stats<T: GitTool + ?Sized>(
    git: &T,
    repo: &Path,
    revision: &str,
) -> Result<LineStats, GitError> {
    let output = git.run(
        repo,
        &["show", "--numstat", "--format=", revision],
        OutputBudget::Revision,
    )?;
    Ok(parse_numstat(&output))
}

fn single_line<T: GitTool + ?Sized>(
    git: &T,
    repo: &Path,
    args: &[&str],
) -> Result<String, GitError> {
    let output = git.run(repo, args, OutputBudget::History)?;
    Ok(output.trim().to_string())
}
