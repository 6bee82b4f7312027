//! Commit statistics for gitpulse.
//!
//! This crate turns commit histories into statistics:
//!
//! - **Aggregation** - author distribution and daily activity of a commit set
//! - **Repository analysis** - full history of one repository, or a batch
//! - **Contributor analysis** - one author across many repositories, with
//!   per-commit line counts and an optional two-year comparison
//! - **Service** - a facade adding discovery and the analysis cache
//!
//! Analyses never fail outright. A repository that cannot be read yields an
//! empty analysis with the failure recorded in [`AnalysisOutcome`].
//!
//! # Repository Analysis
//!
//! ```rust,ignore
//! use gitpulse_analyze::RepositoryAnalyzer;
//! use gitpulse_scan::{RepoScanner, ScanConfig};
//!
//! let scan = RepoScanner::new().scan(&ScanConfig::new("/path/to/projects"));
//! let repos: Vec<_> = scan.valid_repositories().cloned().collect();
//!
//! let analyzer = RepositoryAnalyzer::new();
//! let progress = |done: usize, total: usize| eprintln!("{done}/{total}");
//! for outcome in analyzer.analyze_batch(&repos, Some(&progress)) {
//!     let analysis = outcome.analysis;
//!     if let Some(top) = analysis.top_author() {
//!         println!("{}: {} ({:.1}%)", analysis.repository.name, top.author, top.percentage);
//!     }
//! }
//! ```
//!
//! # Contributor Analysis
//!
//! ```rust,ignore
//! use gitpulse_analyze::ContributorAnalyzer;
//!
//! let report = ContributorAnalyzer::new().analyze("Alice", &repos, Some((2023, 2024)));
//! if let Some(years) = &report.year_comparison {
//!     println!("commits: {:+}", years.commit_delta());
//! }
//! ```

mod contributor;
mod repository;
mod service;
pub mod stats;
pub mod yearly;

pub use contributor::ContributorAnalyzer;
pub use repository::RepositoryAnalyzer;
pub use service::StatsService;
pub use stats::{author_distribution, daily_histogram};
pub use yearly::{compare_years, year_statistics};

// Re-export core types
pub use gitpulse_core::{
    AnalysisCache, AnalysisFailure, AnalysisOutcome, AuthorShare, CommitRecord,
    ContributorAnalysis, ContributorRepository, DailyActivity, FailureKind, MonthLines,
    RepositoryAnalysis, RepositoryDescriptor, RepositoryLines, YearComparison, YearPair,
};
