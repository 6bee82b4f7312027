use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::process::Command;

use gitpulse_git::{queries, GitCli, GitError, GitTool, LineStats, OutputBudget};
use tempfile::TempDir;

/// Answers commands from a fixed table keyed by the joined argument list.
#[derive(Default)]
struct ScriptedGit {
    responses: HashMap<String, String>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedGit {
    fn respond(mut self, args: &str, output: &str) -> Self {
        self.responses.insert(args.to_string(), output.to_string());
        self
    }
}

impl GitTool for ScriptedGit {
    fn ensure_available(&self) -> Result<(), GitError> {
        Ok(())
    }

    fn run(&self, repo: &Path, args: &[&str], _budget: OutputBudget) -> Result<String, GitError> {
        let key = args.join(" ");
        self.calls.borrow_mut().push(key.clone());
        self.responses
            .get(&key)
            .cloned()
            .ok_or_else(|| GitError::CommandFailed {
                args: key,
                cwd: repo.to_path_buf(),
                status: "exit status: 128".into(),
                stderr: "fatal: not a git repository".into(),
            })
    }
}

#[test]
fn test_commit_count_parses_number() {
    let git = ScriptedGit::default().respond("rev-list --count HEAD", "42\n");
    assert_eq!(queries::commit_count(&git, Path::new("/r")).unwrap(), 42);
}

#[test]
fn test_commit_count_rejects_garbage() {
    let git = ScriptedGit::default().respond("rev-list --count HEAD", "lots\n");
    let err = queries::commit_count(&git, Path::new("/r")).unwrap_err();
    assert!(matches!(err, GitError::InvalidOutput { .. }));
}

#[test]
fn test_authors_deduplicated_in_log_order() {
    let git = ScriptedGit::default().respond("log --format=%an", "Bob\nAlice\nBob\n\nCarol\n");
    let authors = queries::authors(&git, Path::new("/r")).unwrap();
    let authors: Vec<&str> = authors.iter().map(String::as_str).collect();
    assert_eq!(authors, vec!["Bob", "Alice", "Carol"]);
}

#[test]
fn test_commit_log_with_author_filter_uses_fixed_strings() {
    let git = ScriptedGit::default().respond(
        "log --pretty=format:%H|%an|%ad|%s --date=short --fixed-strings --author=A. (Work)",
        "abc|A. (Work)|2024-02-01|Ship it",
    );
    let commits = queries::commit_log(&git, Path::new("/r"), Some("A. (Work)")).unwrap();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].author, "A. (Work)");
}

#[test]
fn test_line_stats_query() {
    let git = ScriptedGit::default().respond(
        "show --numstat --format= abc",
        "10\t5\tfoo.ts\n-\t-\tbin/blob\n",
    );
    let stats = queries::line_stats(&git, Path::new("/r"), "abc").unwrap();
    assert_eq!(stats, LineStats::new(10, 5));
    assert_eq!(git.calls.borrow().len(), 1);
}

#[test]
fn test_is_repository_maps_command_failure_to_false() {
    let git = ScriptedGit::default();
    assert!(!queries::is_repository(&git, Path::new("/r")).unwrap());

    let git = git.respond("rev-parse --git-dir", ".git\n");
    assert!(queries::is_repository(&git, Path::new("/r")).unwrap());
}

fn git_available() -> bool {
    which::which("git").is_ok()
}

fn git(repo: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(["-c", "commit.gpgsign=false", "-c", "init.defaultBranch=main"])
        .args(args)
        .current_dir(repo)
        .env("GIT_AUTHOR_NAME", "Alice")
        .env("GIT_AUTHOR_EMAIL", "alice@example.com")
        .env("GIT_COMMITTER_NAME", "Alice")
        .env("GIT_COMMITTER_EMAIL", "alice@example.com")
        .env("GIT_AUTHOR_DATE", "2024-03-10T12:00:00Z")
        .env("GIT_COMMITTER_DATE", "2024-03-10T12:00:00Z")
        .status()
        .unwrap();
    assert!(status.success(), "git {args:?} failed");
}

#[test]
fn test_real_git_round_trip() {
    if !git_available() {
        eprintln!("git not installed, skipping");
        return;
    }

    let temp = TempDir::new().unwrap();
    let repo = temp.path();
    git(repo, &["init", "-q"]);
    fs::write(repo.join("a.txt"), "one\ntwo\nthree\n").unwrap();
    git(repo, &["add", "a.txt"]);
    git(repo, &["commit", "-q", "-m", "Add a | with pipe"]);

    let cli = GitCli::new();
    cli.ensure_available().unwrap();
    assert!(queries::is_repository(&cli, repo).unwrap());
    assert_eq!(queries::commit_count(&cli, repo).unwrap(), 1);
    assert_eq!(queries::head_date(&cli, repo).unwrap(), "2024-03-10");

    let commits = queries::commit_log(&cli, repo, None).unwrap();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].message, "Add a | with pipe");
    assert_eq!(commits[0].date, "2024-03-10");

    let stats = queries::line_stats(&cli, repo, &commits[0].revision).unwrap();
    assert_eq!(stats, LineStats::new(3, 0));
}

#[test]
fn test_real_git_output_bound() {
    if !git_available() {
        return;
    }

    let temp = TempDir::new().unwrap();
    let repo = temp.path();
    git(repo, &["init", "-q"]);
    fs::write(repo.join("a.txt"), "x\n").unwrap();
    git(repo, &["add", "a.txt"]);
    git(repo, &["commit", "-q", "-m", "A commit subject longer than the buffer"]);

    let config = gitpulse_git::GitConfig::builder()
        .max_output_bytes(8usize)
        .build()
        .unwrap();
    let cli = GitCli::with_config(config);
    let err = queries::commit_log(&cli, repo, None).unwrap_err();
    assert!(matches!(err, GitError::OutputTooLarge { limit: 8, .. }));
}

#[test]
fn test_real_git_outside_repository() {
    if !git_available() {
        return;
    }

    let temp = TempDir::new().unwrap();
    let cli = GitCli::new();
    // A fresh temp dir may still sit inside some repository on odd setups,
    // so only the failure shape of HEAD lookups is asserted.
    if queries::is_repository(&cli, temp.path()).unwrap() {
        return;
    }
    let err = queries::head_revision(&cli, temp.path()).unwrap_err();
    assert!(matches!(err, GitError::CommandFailed { .. }));
}
