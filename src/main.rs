//! gitpulse - commit and contributor statistics across many git repositories.
//!
//! Usage:
//!   gitpulse scan [PATH]                     Find repositories below a directory
//!   gitpulse analyze <REPO>                  Analyze one repository's history
//!   gitpulse batch [ROOT]                    Analyze every repository below a directory
//!   gitpulse contributor <ACCOUNT> [ROOT]    One author's activity across repositories
//!   gitpulse cache clear [REPO]              Drop cached analyses
//!   gitpulse --help                          Show help

mod settings;

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use gitpulse_analyze::StatsService;
use gitpulse_cache::JsonFileCache;
use gitpulse_core::{
    AnalysisOutcome, ContributorAnalysis, RepositoryAnalysis, ScanResult, YearComparison,
};
use gitpulse_git::GitCli;

use crate::settings::Settings;

#[derive(Parser)]
#[command(
    name = "gitpulse",
    version,
    about = "Commit and contributor statistics across git repositories",
    long_about = "gitpulse finds git repositories below a directory and summarizes \
                  their history: who commits, how often, and how much code changes.\n\n\
                  Settings are read from config.toml in the platform config directory, \
                  or from the file given with --config."
)]
struct Cli {
    /// Settings file to use instead of the default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find repositories and show their metadata
    Scan {
        /// Directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Maximum directory depth below the root
        #[arg(short, long)]
        depth: Option<u32>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Analyze the full history of one repository
    Analyze {
        /// Repository root
        repo: PathBuf,

        /// Ignore any cached analysis
        #[arg(long)]
        refresh: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Analyze every repository below a directory
    Batch {
        /// Directory to scan
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Maximum directory depth below the root
        #[arg(short, long)]
        depth: Option<u32>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Summarize one author's activity across repositories
    Contributor {
        /// Author name, matched exactly
        account: String,

        /// Directory to scan
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Maximum directory depth below the root
        #[arg(short, long)]
        depth: Option<u32>,

        /// Compare two calendar years
        #[arg(long, num_args = 2, value_names = ["YEAR1", "YEAR2"])]
        years: Option<Vec<i32>>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Manage cached analyses
    Cache {
        #[command(subcommand)]
        action: CacheCommand,
    },
}

#[derive(Subcommand)]
enum CacheCommand {
    /// Remove the cached analysis of one repository, or all of them
    Clear {
        /// Repository root (all repositories when omitted)
        repo: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

type Service = StatsService<GitCli, JsonFileCache>;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings::load(cli.config.as_deref())?;
    let service = StatsService::with_parts(
        GitCli::with_config(settings.git_config()?),
        JsonFileCache::with_config(&settings.cache),
    );

    match cli.command {
        Command::Scan {
            path,
            depth,
            format,
        } => run_scan(&service, &settings, &path, depth, format),
        Command::Analyze {
            repo,
            refresh,
            format,
        } => run_analyze(&service, &repo, refresh, format),
        Command::Batch {
            root,
            depth,
            format,
        } => run_batch(&service, &settings, &root, depth, format),
        Command::Contributor {
            account,
            root,
            depth,
            years,
            format,
        } => {
            let years = years.and_then(|y| match y.as_slice() {
                [year1, year2] => Some((*year1, *year2)),
                _ => None,
            });
            run_contributor(&service, &settings, &account, &root, depth, years, format)
        }
        Command::Cache {
            action: CacheCommand::Clear { repo },
        } => run_cache_clear(&service, repo.as_deref()),
    }
}

/// Send logs to stderr so JSON on stdout stays clean.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Scan a directory and list its repositories.
fn run_scan(
    service: &Service,
    settings: &Settings,
    path: &Path,
    depth: Option<u32>,
    format: OutputFormat,
) -> Result<()> {
    let scan = scan_with_progress(service, settings, path, depth)?;

    match format {
        OutputFormat::Text => print_scan(&scan),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&scan)?),
    }
    Ok(())
}

/// Analyze one repository.
fn run_analyze(service: &Service, repo: &Path, refresh: bool, format: OutputFormat) -> Result<()> {
    let repo = repo.canonicalize().context("Invalid path")?;

    let descriptor = service.describe(&repo);
    if let Some(error) = &descriptor.error {
        eprintln!("warning: {}: {error}", repo.display());
    }

    let outcome = service.analyze(&descriptor, refresh);
    report_failure(&outcome);

    match format {
        OutputFormat::Text => print_analysis(&outcome.analysis),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
    }
    Ok(())
}

/// Scan a directory and analyze every valid repository.
fn run_batch(
    service: &Service,
    settings: &Settings,
    root: &Path,
    depth: Option<u32>,
    format: OutputFormat,
) -> Result<()> {
    let scan = scan_with_progress(service, settings, root, depth)?;
    let repositories: Vec<_> = scan.valid_repositories().cloned().collect();

    let progress = |done: usize, total: usize| progress_line("Analyzing", done, total);
    let outcomes = service.analyze_batch(&repositories, Some(&progress));
    finish_progress(!repositories.is_empty());

    match format {
        OutputFormat::Text => print_batch(&scan, &outcomes),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcomes)?),
    }
    Ok(())
}

/// Summarize one author's activity below a directory.
fn run_contributor(
    service: &Service,
    settings: &Settings,
    account: &str,
    root: &Path,
    depth: Option<u32>,
    years: Option<(i32, i32)>,
    format: OutputFormat,
) -> Result<()> {
    let scan = scan_with_progress(service, settings, root, depth)?;

    eprintln!(
        "Analyzing {account} in {} repositories...",
        scan.total_valid
    );
    let report = service.analyze_contributor(account, &scan.repositories, years);

    match format {
        OutputFormat::Text => print_contributor(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

/// Drop cached analyses.
fn run_cache_clear(service: &Service, repo: Option<&Path>) -> Result<()> {
    match repo {
        Some(repo) => {
            // A deleted repository can still have an entry under its old path
            let repo = repo.canonicalize().unwrap_or_else(|_| repo.to_path_buf());
            service.clear_cache(Some(&repo));
            eprintln!("Cleared cached analysis for {}", repo.display());
        }
        None => {
            service.clear_cache(None);
            eprintln!("Cleared all cached analyses in {}", service.cache().dir().display());
        }
    }
    Ok(())
}

fn scan_with_progress(
    service: &Service,
    settings: &Settings,
    path: &Path,
    depth: Option<u32>,
) -> Result<ScanResult> {
    let path = path.canonicalize().context("Invalid path")?;
    let config = settings.scan_config(&path, depth)?;

    eprintln!("Scanning {}...", path.display());
    let progress = |done: usize, total: usize| progress_line("Scanning", done, total);
    let scan = service.scan(&config, Some(&progress));
    finish_progress(scan.total_scanned > 0 || !scan.warnings.is_empty());

    for warning in &scan.warnings {
        eprintln!("warning: {}", warning.message);
    }
    Ok(scan)
}

/// Overwrite the current stderr line with a progress counter.
fn progress_line(label: &str, done: usize, total: usize) {
    let mut stderr = std::io::stderr();
    let _ = write!(stderr, "\r{label} {done}/{total}");
    let _ = stderr.flush();
}

fn finish_progress(printed: bool) {
    if printed {
        eprintln!();
    }
}

fn report_failure(outcome: &AnalysisOutcome) {
    if let Some(failure) = &outcome.failure {
        eprintln!(
            "warning: analysis of {} is empty ({}): {}",
            outcome.analysis.repository.path.display(),
            failure.kind,
            failure.message
        );
    }
}

fn print_rule() {
    println!("{}", "─".repeat(70));
}

fn print_header(title: &str, subtitle: &str) {
    println!();
    print_rule();
    println!(" {title}");
    if !subtitle.is_empty() {
        println!(" {subtitle}");
    }
    print_rule();
    println!();
}

fn print_scan(scan: &ScanResult) {
    print_header(
        &scan.root_path.display().to_string(),
        &format!(
            "{} repositories ({} valid), scanned in {} ms",
            scan.total_scanned, scan.total_valid, scan.scan_time_ms
        ),
    );

    if scan.repositories.is_empty() {
        println!(" No repositories found.");
        return;
    }

    println!(
        "   {:<24} {:<16} {:>8} {:>8}  {}",
        "Repository", "Branch", "Commits", "Authors", "Last commit"
    );
    for repo in &scan.repositories {
        if repo.is_valid {
            println!(
                "   {:<24} {:<16} {:>8} {:>8}  {}",
                truncate(&repo.name, 24),
                truncate(&repo.current_branch, 16),
                repo.total_commits,
                repo.authors.len(),
                repo.head_date
            );
        } else {
            println!(
                "   {:<24} invalid: {}",
                truncate(&repo.name, 24),
                repo.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    println!();
}

fn print_analysis(analysis: &RepositoryAnalysis) {
    let repo = &analysis.repository;
    print_header(
        &format!("{} ({})", repo.name, repo.path.display()),
        &format!(
            "{} commits by {} authors on {} days",
            analysis.commit_count(),
            analysis.author_stats.len(),
            analysis.daily_stats.len()
        ),
    );

    if analysis.is_empty() {
        println!(" No commits.");
        return;
    }

    println!(" Authors:");
    for share in analysis.author_stats.iter().take(10) {
        let bar = make_bar(share.percentage / 100.0, 20);
        println!(
            "   {:<24} {:>7} {:>6.1}% {}",
            truncate(&share.author, 24),
            share.commit_count,
            share.percentage,
            bar
        );
    }
    let more = analysis.author_stats.len().saturating_sub(10);
    if more > 0 {
        println!("   ... and {more} more");
    }
    println!();

    if let (Some(first), Some(last)) = (analysis.daily_stats.first(), analysis.daily_stats.last()) {
        println!(" Active from {} to {}", first.date, last.date);
    }
    if let Some(day) = analysis.busiest_day() {
        println!(" Busiest day: {} ({} commits)", day.date, day.commit_count);
    }
    println!();

    println!(" Recent commits:");
    for commit in analysis.commits.iter().take(10) {
        println!(
            "   {}  {}  {:<20} {}",
            truncate(&commit.revision, 8),
            commit.date,
            truncate(&commit.author, 20),
            truncate(&commit.message, 40)
        );
    }
    println!();
}

fn print_batch(scan: &ScanResult, outcomes: &[AnalysisOutcome]) {
    let commits: usize = outcomes.iter().map(|o| o.analysis.commit_count()).sum();
    print_header(
        &scan.root_path.display().to_string(),
        &format!("{} repositories analyzed, {commits} commits", outcomes.len()),
    );

    if outcomes.is_empty() {
        println!(" No repositories found.");
        return;
    }

    println!(
        "   {:<24} {:>8} {:>8} {:>6}  {}",
        "Repository", "Commits", "Authors", "Days", "Top author"
    );
    for outcome in outcomes {
        let analysis = &outcome.analysis;
        let top = match (&outcome.failure, analysis.top_author()) {
            (Some(failure), _) => format!("failed: {}", failure.kind),
            (None, Some(top)) => format!("{} ({:.1}%)", top.author, top.percentage),
            (None, None) => "-".to_string(),
        };
        println!(
            "   {:<24} {:>8} {:>8} {:>6}  {}",
            truncate(&analysis.repository.name, 24),
            analysis.commit_count(),
            analysis.author_stats.len(),
            analysis.daily_stats.len(),
            top
        );
    }
    println!();
}

fn print_contributor(report: &ContributorAnalysis) {
    print_header(
        &report.account,
        &format!(
            "{} commits in {} repositories, +{} / -{} lines",
            report.total_commits,
            report.repositories.len(),
            report.total_lines_added(),
            report.total_lines_deleted()
        ),
    );

    if report.repositories.is_empty() {
        println!(" No commits found.");
        return;
    }

    println!(
        "   {:<24} {:>8} {:>7} {:>10} {:>10}",
        "Repository", "Commits", "Share", "Added", "Deleted"
    );
    for entry in &report.repositories {
        let added: u64 = entry.commits.iter().map(|c| c.added()).sum();
        let deleted: u64 = entry.commits.iter().map(|c| c.deleted()).sum();
        println!(
            "   {:<24} {:>8} {:>6.1}% {:>10} {:>10}",
            truncate(&entry.repository.name, 24),
            entry.commit_count,
            entry.percentage,
            added,
            deleted
        );
    }
    println!();
    println!(" Active on {} days", report.daily_stats.len());

    if let Some(years) = &report.year_comparison {
        println!();
        println!(" Year comparison:");
        print_year(&years.year1);
        print_year(&years.year2);
        println!(
            "   change: {:+} commits, {:+} net lines",
            years.commit_delta(),
            years.net_lines_delta()
        );
    }
    println!();
}

fn print_year(year: &YearComparison) {
    let month = |m: Option<gitpulse_core::MonthLines>| {
        m.map(|m| format!("{:02} ({} lines)", m.month, m.lines))
            .unwrap_or_else(|| "-".to_string())
    };
    println!(
        "   {}: {} commits, +{} / -{} (net {:+}), {} repositories",
        year.year,
        year.commit_count,
        year.lines_added,
        year.lines_deleted,
        year.net_lines,
        year.repository_count
    );
    println!(
        "         most added in {}, least in {}",
        month(year.max_added_month),
        month(year.min_added_month)
    );
    if let Some(repo) = &year.max_added_repository {
        println!("         top repository: {} (+{})", repo.name, repo.lines);
    }
}

/// Create a simple bar.
fn make_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio * width as f64).round() as usize).min(width);
    let empty = width - filled;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Truncate a string to at most `max_len` characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_len.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("héllo wörld", 6), "héllo…");
    }

    #[test]
    fn test_make_bar_clamps() {
        assert_eq!(make_bar(0.5, 4), "[██░░]");
        assert_eq!(make_bar(1.5, 2), "[██]");
    }

    #[test]
    fn test_years_flag_parses_pair() {
        let cli = Cli::try_parse_from([
            "gitpulse", "contributor", "Alice", "/src", "--years", "2023", "2024",
        ])
        .unwrap();
        match cli.command {
            Command::Contributor { years, .. } => assert_eq!(years, Some(vec![2023, 2024])),
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
