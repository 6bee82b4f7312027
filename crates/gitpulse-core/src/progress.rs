//! Progress reporting.

use std::path::PathBuf;
use std::time::Duration;

/// Observer notified as a batch operation completes items.
///
/// Calls arrive in order with a strictly increasing `completed` count,
/// ending at `(total, total)`.
pub trait ProgressSink {
    fn report(&self, completed: usize, total: usize);
}

impl<F> ProgressSink for F
where
    F: Fn(usize, usize),
{
    fn report(&self, completed: usize, total: usize) {
        self(completed, total)
    }
}

/// Progress information during a repository scan.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Directories fully processed so far.
    pub dirs_visited: u64,
    /// Directories enumerated before processing began.
    pub total_dirs: u64,
    /// Repository roots found so far.
    pub repositories_found: u64,
    /// Directory just processed.
    pub current_path: PathBuf,
    /// Time elapsed since the scan started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new(total_dirs: u64) -> Self {
        Self {
            dirs_visited: 0,
            total_dirs,
            repositories_found: 0,
            current_path: PathBuf::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Fraction of directories processed, from 0.0 to 1.0.
    pub fn fraction(&self) -> f64 {
        if self.total_dirs > 0 {
            self.dirs_visited as f64 / self.total_dirs as f64
        } else {
            1.0
        }
    }

    /// Check whether every enumerated directory has been processed.
    pub fn is_complete(&self) -> bool {
        self.dirs_visited >= self.total_dirs
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new(0)
    }
}
