//! Settings loaded from `config.toml`.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{eyre, Context, Result};
use serde::{Deserialize, Serialize};

use gitpulse_cache::CacheConfig;
use gitpulse_core::{GitConfig, ScanConfig, DEFAULT_MAX_DEPTH};

/// Discovery settings; the root always comes from the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub max_depth: u32,
    pub skip_dirs: Vec<String>,
    pub follow_symlinks: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        let defaults = ScanConfig::default();
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            skip_dirs: defaults.skip_dirs,
            follow_symlinks: defaults.follow_symlinks,
        }
    }
}

/// Everything configurable from the settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scan: ScanSettings,
    pub git: GitConfig,
    pub cache: CacheConfig,
}

impl Settings {
    /// Default location of the settings file.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("gitpulse").join("config.toml"))
    }

    /// Load settings from `explicit`, or from the default location.
    ///
    /// A missing default file means defaults; a missing explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::config_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let settings = Self::parse(&content)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Parse settings from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Build a validated scan configuration for `root`.
    pub fn scan_config(&self, root: &Path, depth: Option<u32>) -> Result<ScanConfig> {
        ScanConfig::builder()
            .root(root)
            .max_depth(depth.unwrap_or(self.scan.max_depth))
            .skip_dirs(self.scan.skip_dirs.clone())
            .follow_symlinks(self.scan.follow_symlinks)
            .build()
            .map_err(|e| eyre!("Invalid scan settings: {e}"))
    }

    /// Validated tool configuration.
    pub fn git_config(&self) -> Result<GitConfig> {
        GitConfig::builder()
            .program(self.git.program.clone())
            .max_output_bytes(self.git.max_output_bytes)
            .max_numstat_bytes(self.git.max_numstat_bytes)
            .timeout_secs(self.git.timeout_secs)
            .build()
            .map_err(|e| eyre!("Invalid git settings: {e}"))
    }
}
