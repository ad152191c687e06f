//! Configuration constants and settings

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// Workspace layout
pub const CLONE_DIR: &str = "remote_repositories";
pub const STAGING_DIR: &str = "local_modules";
pub const DOCS_DIR: &str = "docs";
pub const LOG_DIR: &str = "log";
pub const REGISTRY_FILE: &str = "repos.json";
pub const WORKSPACE_CONFIG_FILE: &str = "fleet.toml";
pub const GLOBAL_CONFIG_DIR: &str = "repo-fleet";
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";
pub const WORKSPACE_ENV_VAR: &str = "REPO_FLEET_WORKSPACE";

/// Origin recorded for repositories discovered on disk rather than added by URL
pub const UNKNOWN_ORIGIN: &str = "unknown";

// Module staging
pub const PAYLOAD_WRAPPER_DIR: &str = "transforms-python";
pub const PAYLOAD_SOURCE_DIR: &str = "src";
pub const NAMESPACE_MARKER_FILE: &str = "__init__.py";

/// Subdirectories of `src` that are never a payload
pub const EXCLUDED_PAYLOAD_DIRS: &[&str] = &[
    "expectations",
    "test",
    "tests",
    "__pycache__",
    ".ruff_cache",
    ".mypy_cache",
    ".pytest_cache",
];

/// Files stripped from the staging tree after every copy batch
pub const SANITIZED_FILE_NAMES: &[&str] = &["pipeline.py", "setup.py"];

// Git invocation
pub const GIT_METADATA_DIR: &str = ".git";
pub const DEFAULT_GIT_TIMEOUT_SECS: u64 = 180; // 3 minutes per invocation

// Default concurrency cap to avoid hammering the git host with parallel pushes
pub const GIT_CONCURRENT_CAP: usize = 12;

// Progress bar configuration
pub const DEFAULT_PROGRESS_BAR_LENGTH: u64 = 1000;
pub const PROGRESS_CHARS: &str = "##-";
pub const PROGRESS_TEMPLATE: &str = "{prefix:.bold} [{bar:40}] {percent:>3}% {wide_msg}";

// Display formatting constants
pub const PATH_DISPLAY_WIDTH: usize = 30;
pub const ERROR_MESSAGE_MAX_LENGTH: usize = 60;
pub const ERROR_MESSAGE_TRUNCATE_LENGTH: usize = 57;

/// Raw settings as read from a TOML file; every key is optional
#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    pub clone_dir: Option<PathBuf>,
    pub staging_dir: Option<PathBuf>,
    pub docs_dir: Option<PathBuf>,
    pub registry_file: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub git_timeout_secs: Option<u64>,
    pub jobs: Option<usize>,
}

impl SettingsFile {
    /// Reads a settings file, returning `None` when it does not exist
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let parsed = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
        Ok(Some(parsed))
    }

    /// Overlays `other` on top of `self`; keys set in `other` win
    pub fn merge(self, other: SettingsFile) -> SettingsFile {
        SettingsFile {
            clone_dir: other.clone_dir.or(self.clone_dir),
            staging_dir: other.staging_dir.or(self.staging_dir),
            docs_dir: other.docs_dir.or(self.docs_dir),
            registry_file: other.registry_file.or(self.registry_file),
            log_dir: other.log_dir.or(self.log_dir),
            git_timeout_secs: other.git_timeout_secs.or(self.git_timeout_secs),
            jobs: other.jobs.or(self.jobs),
        }
    }
}

/// Fully resolved workspace settings
///
/// Relative paths from settings files are resolved against the workspace root.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub workspace_root: PathBuf,
    pub clone_root: PathBuf,
    pub staging_root: PathBuf,
    pub docs_root: PathBuf,
    pub registry_path: PathBuf,
    pub log_dir: PathBuf,
    pub git_timeout: Duration,
    pub jobs: Option<usize>,
}

impl Settings {
    /// Default layout rooted at `workspace_root`, ignoring any settings files
    pub fn for_workspace(workspace_root: impl Into<PathBuf>) -> Self {
        Self::from_file(workspace_root.into(), SettingsFile::default())
    }

    /// Loads settings for a workspace: defaults, then the global config file,
    /// then `<workspace>/fleet.toml`
    pub fn load(workspace_root: impl Into<PathBuf>) -> Result<Self> {
        let workspace_root = workspace_root.into();

        let global = match dirs::config_dir() {
            Some(dir) => SettingsFile::load(&dir.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE))?
                .unwrap_or_default(),
            None => SettingsFile::default(),
        };
        let local = SettingsFile::load(&workspace_root.join(WORKSPACE_CONFIG_FILE))?
            .unwrap_or_default();

        Ok(Self::from_file(workspace_root, global.merge(local)))
    }

    fn from_file(workspace_root: PathBuf, file: SettingsFile) -> Self {
        let resolve = |value: Option<PathBuf>, default: &str| {
            let path = value.unwrap_or_else(|| PathBuf::from(default));
            if path.is_absolute() {
                path
            } else {
                workspace_root.join(path)
            }
        };

        Self {
            clone_root: resolve(file.clone_dir, CLONE_DIR),
            staging_root: resolve(file.staging_dir, STAGING_DIR),
            docs_root: resolve(file.docs_dir, DOCS_DIR),
            registry_path: resolve(file.registry_file, REGISTRY_FILE),
            log_dir: resolve(file.log_dir, LOG_DIR),
            git_timeout: Duration::from_secs(
                file.git_timeout_secs.unwrap_or(DEFAULT_GIT_TIMEOUT_SECS).max(1),
            ),
            jobs: file.jobs,
            workspace_root,
        }
    }
}

/// Picks the workspace root: explicit flag, then `REPO_FLEET_WORKSPACE`, then
/// the current directory
pub fn resolve_workspace_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Ok(path) = std::env::var(WORKSPACE_ENV_VAR) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    std::env::current_dir().context("Failed to determine current directory")
}

/// Determines the concurrency limit for batch git operations
///
/// Priority order:
/// 1. --sequential flag → 1
/// 2. --jobs N flag → N
/// 3. `jobs` from settings → N
/// 4. Smart default → min(CPU_CORES + 2, 12)
pub fn get_git_concurrency(jobs: Option<usize>, sequential: bool, configured: Option<usize>) -> usize {
    if sequential {
        return 1;
    }

    if let Some(n) = jobs.or(configured) {
        return n.max(1);
    }

    let cpu_count = num_cpus::get();
    (cpu_count + 2).min(GIT_CONCURRENT_CAP)
}
