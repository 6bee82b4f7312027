//! Invocation of the external `git` binary.

use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use gitpulse_core::{GitConfig, GitError};

/// Maximum stderr kept for error messages.
const STDERR_LIMIT: usize = 64 * 1024;

/// How often a timed invocation checks whether the child has exited.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Which output bound an invocation is held to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputBudget {
    /// Log and metadata queries.
    History,
    /// A single revision's line-count report.
    Revision,
}

/// Runs git commands in a repository and returns their stdout.
///
/// Every call is blocking. Implementations must return `ToolUnavailable`
/// only when the tool cannot be invoked at all.
pub trait GitTool {
    /// Verify the tool can be invoked.
    fn ensure_available(&self) -> Result<(), GitError>;

    /// Run `git <args>` with `repo` as working directory.
    fn run(&self, repo: &Path, args: &[&str], budget: OutputBudget) -> Result<String, GitError>;
}

impl<T: GitTool + ?Sized> GitTool for &T {
    fn ensure_available(&self) -> Result<(), GitError> {
        (**self).ensure_available()
    }

    fn run(&self, repo: &Path, args: &[&str], budget: OutputBudget) -> Result<String, GitError> {
        (**self).run(repo, args, budget)
    }
}

/// [`GitTool`] backed by the real `git` binary.
#[derive(Debug, Clone, Default)]
pub struct GitCli {
    config: GitConfig,
}

impl GitCli {
    /// Create a runner with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner with custom configuration.
    pub fn with_config(config: GitConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &GitConfig {
        &self.config
    }

    fn limit(&self, budget: OutputBudget) -> usize {
        match budget {
            OutputBudget::History => self.config.max_output_bytes,
            OutputBudget::Revision => self.config.max_numstat_bytes,
        }
    }

    fn spawn(&self, repo: &Path, args: &[&str]) -> Result<Child, GitError> {
        if !repo.is_dir() {
            // A missing working directory also surfaces as NotFound from spawn,
            // which would be mistaken for a missing binary.
            return Err(GitError::Spawn {
                program: self.config.program.clone(),
                cwd: repo.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "working directory does not exist"),
            });
        }

        Command::new(&self.config.program)
            .args(args)
            .current_dir(repo)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GitError::spawn(&self.config.program, repo, e))
    }

    fn wait(&self, child: &mut Child, repo: &Path, rendered: &str) -> Result<ExitStatus, GitError> {
        let io_err = |source| GitError::Spawn {
            program: self.config.program.clone(),
            cwd: repo.to_path_buf(),
            source,
        };

        let Some(timeout) = self.config.command_timeout() else {
            return child.wait().map_err(io_err);
        };

        let start = Instant::now();
        loop {
            if let Some(status) = child.try_wait().map_err(io_err)? {
                return Ok(status);
            }
            if start.elapsed() >= timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(GitError::Timeout {
                    args: rendered.to_string(),
                    after: timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl GitTool for GitCli {
    fn ensure_available(&self) -> Result<(), GitError> {
        which::which(&self.config.program)
            .map(|_| ())
            .map_err(|_| GitError::ToolUnavailable {
                program: self.config.program.clone(),
            })
    }

    fn run(&self, repo: &Path, args: &[&str], budget: OutputBudget) -> Result<String, GitError> {
        let rendered = args.join(" ");
        let limit = self.limit(budget);
        tracing::debug!(cwd = %repo.display(), args = %rendered, "running git");

        let mut child = self.spawn(repo, args)?;

        // Both pipes are drained on their own threads so a chatty stderr or an
        // oversized stdout can never stall the child.
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_reader = thread::spawn(move || read_bounded(stdout, limit));
        let stderr_reader = thread::spawn(move || read_bounded(stderr, STDERR_LIMIT));

        let status = self.wait(&mut child, repo, &rendered);

        let stdout = join_reader(stdout_reader, &rendered)?;
        let stderr = join_reader(stderr_reader, &rendered)?;
        let status = status?;

        if stdout.overflowed {
            return Err(GitError::OutputTooLarge {
                args: rendered,
                limit,
            });
        }

        if !status.success() {
            return Err(GitError::CommandFailed {
                args: rendered,
                cwd: repo.to_path_buf(),
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&stderr.bytes).trim().to_string(),
            });
        }

        tracing::debug!(args = %rendered, bytes = stdout.bytes.len(), "git finished");
        Ok(String::from_utf8_lossy(&stdout.bytes).into_owned())
    }
}

/// Output captured from one pipe.
#[derive(Debug, Default)]
struct Captured {
    bytes: Vec<u8>,
    overflowed: bool,
}

/// Read up to `limit` bytes, then keep draining without storing.
fn read_bounded<R: Read>(pipe: Option<R>, limit: usize) -> io::Result<Captured> {
    let Some(mut pipe) = pipe else {
        return Ok(Captured::default());
    };

    let mut bytes = Vec::new();
    (&mut pipe).take(limit as u64 + 1).read_to_end(&mut bytes)?;

    let overflowed = bytes.len() > limit;
    if overflowed {
        bytes.truncate(limit);
        io::copy(&mut pipe, &mut io::sink())?;
    }

    Ok(Captured { bytes, overflowed })
}

fn join_reader(
    handle: thread::JoinHandle<io::Result<Captured>>,
    rendered: &str,
) -> Result<Captured, GitError> {
    let invalid = |message: String| GitError::InvalidOutput {
        args: rendered.to_string(),
        message,
    };
    handle
        .join()
        .map_err(|_| invalid("output reader panicked".to_string()))?
        .map_err(|e| invalid(e.to_string()))
}
