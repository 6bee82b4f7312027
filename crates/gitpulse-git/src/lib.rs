//! Git command runner and log parsing for gitpulse.
//!
//! gitpulse never reads repository internals itself. Every question about a
//! repository is answered by running the `git` binary and parsing its text
//! output, which this crate wraps in three layers:
//!
//! - [`GitTool`] - the seam to the external process. [`GitCli`] is the real
//!   implementation, with a bounded output buffer and an optional timeout.
//! - [`queries`] - typed questions (branch, head, commit count, authors, log,
//!   per-revision line counts) built on any `GitTool`.
//! - [`parser`] - pure functions turning log and numstat text into records.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use gitpulse_git::{queries, GitCli};
//!
//! let git = GitCli::new();
//! let commits = queries::commit_log(&git, Path::new("."), None).unwrap();
//! println!("{} commits", commits.len());
//! ```

pub mod parser;
pub mod queries;
mod tool;

pub use parser::{parse_log, parse_numstat, LOG_FORMAT};
pub use tool::{GitCli, GitTool, OutputBudget};

// Re-export core types for convenience
pub use gitpulse_core::{CommitRecord, GitConfig, GitError, LineStats};
