//! Public API for the core module.
//!
//! This module provides the stable public API for core functionality including:
//! - The repository registry
//! - Progress sinks
//! - Batch statistics and summaries
//! - Configuration utilities

// Registry
pub use super::registry::{derive_repository_name, Registry, RepositoryMap, RepositoryRecord};

// Progress
pub use super::progress::{create_progress_bar, BatchProgress, LogProgress, NoProgress, ProgressSink};

// Statistics
pub use super::stats::BatchReport;

// Configuration
pub use super::config::{get_git_concurrency, resolve_workspace_root, Settings, SettingsFile};
pub use super::config::{GIT_CONCURRENT_CAP, UNKNOWN_ORIGIN};

// Terminal utilities (re-exported from utils)
pub use crate::utils::{set_terminal_title, set_terminal_title_and_flush};

// Internal helpers for command modules
pub(crate) use super::stats::clean_error_message;
