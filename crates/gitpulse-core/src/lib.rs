//! Core types and traits for gitpulse.
//!
//! This crate provides the value objects shared by every other gitpulse crate:
//! commit records, repository descriptors, analysis results, contributor
//! reports, configuration, the error taxonomy, and the two ports the engine
//! talks through (progress reporting and the analysis cache).

mod analysis;
mod cache;
mod commit;
mod config;
mod contributor;
mod error;
mod progress;
mod repository;

pub use analysis::{AnalysisOutcome, AuthorShare, DailyActivity, RepositoryAnalysis};
pub use cache::{AnalysisCache, CacheEntry, NoCache};
pub use commit::{CommitRecord, LineStats};
pub use config::{
    GitConfig, GitConfigBuilder, ScanConfig, ScanConfigBuilder, DEFAULT_MAX_DEPTH,
    DEFAULT_MAX_NUMSTAT_BYTES, DEFAULT_MAX_OUTPUT_BYTES,
};
pub use contributor::{
    ContributorAnalysis, ContributorRepository, MonthLines, RepositoryLines, YearComparison,
    YearPair,
};
pub use error::{AnalysisFailure, FailureKind, GitError, ScanWarning, WarningKind};
pub use progress::{ProgressSink, ScanProgress};
pub use repository::{RepositoryDescriptor, ScanResult};
