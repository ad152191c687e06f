//! Per-target outcome status and utilities

/// Terminal state of one target within a batch
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Every git invocation for the target succeeded
    Success,
    /// The target directory has no `.git` metadata; nothing was run
    SkippedNotAGitRepo,
    /// Clone destination already exists; nothing was run
    SkippedAlreadyExists,
    /// A git invocation exited non-zero, timed out or could not be spawned
    Failed(String),
}

impl OutcomeStatus {
    /// Returns the emoji symbol for this status
    pub fn symbol(&self) -> &str {
        match self {
            OutcomeStatus::Success => "🟢",
            OutcomeStatus::SkippedNotAGitRepo | OutcomeStatus::SkippedAlreadyExists => "🟠",
            OutcomeStatus::Failed(_) => "🔴",
        }
    }

    /// Returns the text representation of this status
    pub fn text(&self) -> &str {
        match self {
            OutcomeStatus::Success => "ok",
            OutcomeStatus::SkippedNotAGitRepo => "not-a-repo",
            OutcomeStatus::SkippedAlreadyExists => "exists",
            OutcomeStatus::Failed(_) => "failed",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeStatus::Success)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            OutcomeStatus::SkippedNotAGitRepo | OutcomeStatus::SkippedAlreadyExists
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, OutcomeStatus::Failed(_))
    }

    /// Failure reason, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            OutcomeStatus::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Exactly one of these is produced per target of a batch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PerTargetOutcome {
    pub name: String,
    pub status: OutcomeStatus,
    /// Short human-readable detail ("created", "already existed", ...)
    pub message: String,
}

impl PerTargetOutcome {
    pub fn new(name: impl Into<String>, status: OutcomeStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            message: message.into(),
        }
    }
}
