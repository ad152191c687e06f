//! Outcome tallies and summaries for completed batches

use crate::core::config::{
    ERROR_MESSAGE_MAX_LENGTH, ERROR_MESSAGE_TRUNCATE_LENGTH, PATH_DISPLAY_WIDTH,
};
use crate::git::{OutcomeStatus, PerTargetOutcome};
use std::path::Path;
use std::time::Duration;

/// Result of one batch: exactly one outcome per target, in target order
#[derive(Clone, Debug)]
pub struct BatchReport {
    /// Short operation label ("clone", "sync", "branch", "commit")
    pub operation: &'static str,
    pub outcomes: Vec<PerTargetOutcome>,
    pub duration: Duration,
}

impl BatchReport {
    pub fn new(operation: &'static str, outcomes: Vec<PerTargetOutcome>, duration: Duration) -> Self {
        Self {
            operation,
            outcomes,
            duration,
        }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_success()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_skipped()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_failed()).count()
    }

    /// Outcomes that ended in failure
    pub fn failed(&self) -> Vec<&PerTargetOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_failed()).collect()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    /// Status for a named target
    pub fn status_of(&self, name: &str) -> Option<&OutcomeStatus> {
        self.outcomes.iter().find(|o| o.name == name).map(|o| &o.status)
    }

    /// One-line summary of the batch
    pub fn generate_summary(&self) -> String {
        let duration_secs = self.duration.as_secs_f64();
        let failed = self.failed_count();

        if failed > 0 {
            format!(
                "✅ {} completed in {:.1}s • {} ok • {} skipped • {} failed",
                self.operation,
                duration_secs,
                self.succeeded(),
                self.skipped(),
                failed
            )
        } else {
            format!(
                "✅ {} completed in {:.1}s • {} ok • {} skipped",
                self.operation,
                duration_secs,
                self.succeeded(),
                self.skipped()
            )
        }
    }

    /// Tree-formatted list of targets needing attention, rooted at `clone_root`
    /// for path display
    pub fn generate_detailed_summary(&self, clone_root: &Path) -> String {
        let mut lines = Vec::new();

        let failed: Vec<_> = self.failed();
        if !failed.is_empty() {
            lines.push(format!("🔴 FAILED REPOS ({})", failed.len()));
            for (i, outcome) in failed.iter().enumerate() {
                let tree_char = if i == failed.len() - 1 { "└─" } else { "├─" };
                let repo_path = clone_root.join(&outcome.name);
                let short_path =
                    crate::utils::shorten_path(&repo_path, PATH_DISPLAY_WIDTH);
                let reason = outcome.status.reason().unwrap_or_default();
                lines.push(format!(
                    "   {} {:20} {:30} # {}",
                    tree_char,
                    outcome.name,
                    short_path,
                    clean_error_message(reason)
                ));
            }
            lines.push(String::new());
        }

        let skipped: Vec<_> = self
            .outcomes
            .iter()
            .filter(|o| o.status.is_skipped())
            .collect();
        if !skipped.is_empty() {
            lines.push(format!("🟠 SKIPPED ({})", skipped.len()));
            for (i, outcome) in skipped.iter().enumerate() {
                let tree_char = if i == skipped.len() - 1 { "└─" } else { "├─" };
                lines.push(format!(
                    "   {} {:20} {}",
                    tree_char, outcome.name, outcome.message
                ));
            }
        }

        // Remove trailing blank line if it exists
        if lines.last() == Some(&String::new()) {
            lines.pop();
        }

        lines.join("\n")
    }
}

/// Cleans and formats error messages for display
pub(crate) fn clean_error_message(error: &str) -> String {
    // Replace newlines/tabs with spaces and collapse whitespace
    let cleaned = error.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.contains("timed out") {
        "timeout".to_string()
    } else if cleaned.contains("Authentication failed") || cleaned.contains("Permission denied") {
        "authentication failed".to_string()
    } else if cleaned.contains("CONFLICT") || cleaned.contains("diverged") {
        "merge conflict".to_string()
    } else if cleaned.contains("nothing to commit") {
        "nothing to commit".to_string()
    } else if cleaned.chars().count() > ERROR_MESSAGE_MAX_LENGTH {
        let truncated: String = cleaned.chars().take(ERROR_MESSAGE_TRUNCATE_LENGTH).collect();
        format!("{truncated}...")
    } else {
        cleaned
    }
}
