//! Per-repository metadata collection.

use std::path::Path;

use gitpulse_core::{GitError, RepositoryDescriptor};
use gitpulse_git::{queries, GitTool};

/// Describe the repository rooted at `path`.
///
/// Never fails: if any query errors, the descriptor is returned invalid with
/// the error text and empty metadata.
pub fn describe_repository<G: GitTool + ?Sized>(git: &G, path: &Path) -> RepositoryDescriptor {
    match collect(git, path) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            tracing::warn!(
                repo = %path.display(),
                error = %err,
                "could not read repository metadata"
            );
            RepositoryDescriptor::invalid(path, err.to_string())
        }
    }
}

fn collect<G: GitTool + ?Sized>(git: &G, path: &Path) -> Result<RepositoryDescriptor, GitError> {
    git.ensure_available()?;
    if !queries::is_repository(git, path)? {
        return Err(GitError::NotARepository {
            path: path.to_path_buf(),
        });
    }

    let mut descriptor = RepositoryDescriptor::at(path);
    descriptor.current_branch = queries::current_branch(git, path)?;
    descriptor.head_revision = queries::head_revision(git, path)?;
    descriptor.head_date = queries::head_date(git, path)?;
    descriptor.total_commits = queries::commit_count(git, path)?;
    descriptor.authors = queries::authors(git, path)?;

    tracing::debug!(
        repo = %path.display(),
        commits = descriptor.total_commits,
        authors = descriptor.authors.len(),
        "described repository"
    );
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use gitpulse_git::OutputBudget;

    /// Fails every command, recording what was asked.
    #[derive(Default)]
    struct OutsideRepository {
        calls: RefCell<Vec<String>>,
    }

    impl GitTool for OutsideRepository {
        fn ensure_available(&self) -> Result<(), GitError> {
            Ok(())
        }

        fn run(
            &self,
            repo: &Path,
            args: &[&str],
            _budget: OutputBudget,
        ) -> Result<String, GitError> {
            self.calls.borrow_mut().push(args.join(" "));
            Err(GitError::CommandFailed {
                args: args.join(" "),
                cwd: repo.to_path_buf(),
                status: "exit status: 128".into(),
                stderr: "fatal: not a git repository".into(),
            })
        }
    }

    #[test]
    fn test_non_repository_stops_after_validity_check() {
        let git = OutsideRepository::default();
        let descriptor = describe_repository(&git, Path::new("/src/plain"));

        assert!(!descriptor.is_valid);
        assert!(descriptor.error.unwrap().contains("is not a git repository"));
        assert_eq!(*git.calls.borrow(), vec!["rev-parse --git-dir".to_string()]);
    }
}
