//! Scan and tool configuration types.

use std::path::PathBuf;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Default recursion depth below the scan root.
pub const DEFAULT_MAX_DEPTH: u32 = 3;

/// Default output bound for log and metadata queries (10 MiB).
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Default output bound for a per-revision line-count report (1 MiB).
pub const DEFAULT_MAX_NUMSTAT_BYTES: usize = 1024 * 1024;

/// Configuration for repository discovery.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Root path to scan.
    pub root: PathBuf,

    /// Maximum depth below the root at which directories are listed.
    #[builder(default = "DEFAULT_MAX_DEPTH")]
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Directory names never descended into.
    #[builder(default = "default_skip_dirs()")]
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,

    /// Name of the tool's metadata directory.
    #[builder(default = "default_metadata_dir()")]
    #[serde(default = "default_metadata_dir")]
    pub metadata_dir: String,

    /// Follow symbolic links.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_max_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

fn default_skip_dirs() -> Vec<String> {
    ["node_modules", "dist", "build", ".next"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_metadata_dir() -> String {
    ".git".to_string()
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        if let Some(ref dir) = self.metadata_dir {
            if dir.is_empty() {
                return Err("Metadata directory name cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config for scanning a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_depth: DEFAULT_MAX_DEPTH,
            skip_dirs: default_skip_dirs(),
            metadata_dir: default_metadata_dir(),
            follow_symlinks: false,
        }
    }

    /// Check if a directory should be skipped entirely.
    pub fn should_skip(&self, name: &str) -> bool {
        self.skip_dirs.iter().any(|skip| skip == name)
    }

    /// Check if a directory name is the metadata directory.
    pub fn is_metadata_dir(&self, name: &str) -> bool {
        name == self.metadata_dir
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Configuration for invoking the external tool.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct GitConfig {
    /// Program to run.
    #[builder(default = "default_program()")]
    #[serde(default = "default_program")]
    pub program: String,

    /// Output bound for log and metadata queries.
    #[builder(default = "DEFAULT_MAX_OUTPUT_BYTES")]
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,

    /// Output bound for per-revision line-count reports.
    #[builder(default = "DEFAULT_MAX_NUMSTAT_BYTES")]
    #[serde(default = "default_max_numstat_bytes")]
    pub max_numstat_bytes: usize,

    /// Kill an invocation after this many seconds (None = wait indefinitely).
    #[builder(default)]
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_program() -> String {
    "git".to_string()
}

fn default_max_output_bytes() -> usize {
    DEFAULT_MAX_OUTPUT_BYTES
}

fn default_max_numstat_bytes() -> usize {
    DEFAULT_MAX_NUMSTAT_BYTES
}

impl GitConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref program) = self.program {
            if program.trim().is_empty() {
                return Err("Program cannot be empty".to_string());
            }
        }
        if self.max_output_bytes == Some(0) || self.max_numstat_bytes == Some(0) {
            return Err("Output buffer must be larger than zero".to_string());
        }
        if let Some(Some(0)) = self.timeout_secs {
            return Err("Timeout must be at least one second".to_string());
        }
        Ok(())
    }
}

impl GitConfig {
    /// Create a new tool config builder.
    pub fn builder() -> GitConfigBuilder {
        GitConfigBuilder::default()
    }

    /// The invocation timeout, if any.
    pub fn command_timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            max_numstat_bytes: DEFAULT_MAX_NUMSTAT_BYTES,
            timeout_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_config_builder() {
        let config = ScanConfig::builder()
            .root("/home/user/src")
            .max_depth(5u32)
            .build()
            .unwrap();

        assert_eq!(config.root, PathBuf::from("/home/user/src"));
        assert_eq!(config.max_depth, 5);
        assert_eq!(config.metadata_dir, ".git");
        assert!(config.should_skip("node_modules"));
    }

    #[test]
    fn test_scan_config_requires_root() {
        assert!(ScanConfig::builder().build().is_err());
        assert!(ScanConfig::builder().root("").build().is_err());
    }

    #[test]
    fn test_default_skip_list() {
        let config = ScanConfig::new("/src");
        for name in ["node_modules", "dist", "build", ".next"] {
            assert!(config.should_skip(name), "{name} should be skipped");
        }
        assert!(!config.should_skip("src"));
        assert!(!config.should_skip(".git"));
        assert!(config.is_metadata_dir(".git"));
    }

    #[test]
    fn test_git_config_defaults() {
        let config = GitConfig::default();
        assert_eq!(config.program, "git");
        assert_eq!(config.max_output_bytes, 10 * 1024 * 1024);
        assert_eq!(config.max_numstat_bytes, 1024 * 1024);
        assert!(config.command_timeout().is_none());
    }

    #[test]
    fn test_git_config_validation() {
        assert!(GitConfig::builder().program("  ").build().is_err());
        assert!(GitConfig::builder().max_output_bytes(0usize).build().is_err());
        assert!(GitConfig::builder().timeout_secs(Some(0u64)).build().is_err());

        let config = GitConfig::builder().timeout_secs(Some(30u64)).build().unwrap();
        assert_eq!(config.command_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: GitConfig = serde_json::from_str(r#"{"timeout_secs": 5}"#).unwrap();
        assert_eq!(config.program, "git");
        assert_eq!(config.timeout_secs, Some(5));
    }
}
