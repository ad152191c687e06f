//! Batch execution of one git operation across many repositories
//!
//! Each target runs through `Pending → Running → {Done, Failed, Skipped}`
//! independently. A failure is logged and recorded for that target only; the
//! batch always runs to the end of its target list and always leaves the
//! progress sink at exactly `1.0`.

use futures::stream::{FuturesUnordered, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

use super::operations::{
    checkout, clone_repository, commit, create_branch, has_git_metadata, local_branch_exists,
    pull, push_branch, push_set_upstream, stage_all, GitClient,
};
use super::status::{OutcomeStatus, PerTargetOutcome};
use crate::core::progress::{BatchProgress, ProgressSink};
use crate::core::registry::RepositoryRecord;
use crate::core::stats::BatchReport;

/// Number of progress steps a commit-and-push target reports
const COMMIT_PUSH_PHASES: u64 = 4;

/// The git sub-operation applied to every target of a batch
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Clone the target's origin into the clone root
    Clone,
    /// Checkout `branch` and pull
    SyncBranch { branch: String },
    /// Create `new_branch` from `base_branch` unless it already exists locally
    EnsureBranch {
        new_branch: String,
        base_branch: String,
    },
    /// Checkout `branch`, stage everything, commit with `message` and push
    CommitPush { branch: String, message: String },
}

impl Operation {
    /// Short label used in summaries and logs
    pub fn label(&self) -> &'static str {
        match self {
            Operation::Clone => "clone",
            Operation::SyncBranch { .. } => "sync",
            Operation::EnsureBranch { .. } => "branch",
            Operation::CommitPush { .. } => "commit",
        }
    }

    /// Progress steps each target is worth
    fn phases(&self) -> u64 {
        match self {
            Operation::CommitPush { .. } => COMMIT_PUSH_PHASES,
            _ => 1,
        }
    }
}

/// One user action applied to an ordered list of targets
#[derive(Clone, Debug)]
pub struct BatchJob {
    pub operation: Operation,
    pub targets: Vec<RepositoryRecord>,
}

impl BatchJob {
    pub fn new(operation: Operation, targets: Vec<RepositoryRecord>) -> Self {
        Self { operation, targets }
    }
}

/// Per-target share of the batch progress
///
/// Steps are credited as they complete; whatever a target did not report by
/// the time it finishes (skip, early failure) is credited at the end so the
/// batch total always closes.
struct TargetProgress<'p, 'a> {
    batch: &'p BatchProgress<'a>,
    phases: u64,
    reported: u64,
}

impl<'p, 'a> TargetProgress<'p, 'a> {
    fn phase_done(&mut self) {
        if self.reported < self.phases {
            self.reported += 1;
            self.batch.advance(1);
        }
    }

    fn finish(self) {
        let remaining = self.phases - self.reported;
        if remaining > 0 {
            self.batch.advance(remaining);
        }
    }
}

/// Runs git operations over repositories under one clone root
#[derive(Clone)]
pub struct BatchOperator {
    git: Arc<dyn GitClient>,
    clone_root: PathBuf,
    concurrency: usize,
}

impl BatchOperator {
    pub fn new(git: Arc<dyn GitClient>, clone_root: impl Into<PathBuf>, concurrency: usize) -> Self {
        Self {
            git,
            clone_root: clone_root.into(),
            concurrency: concurrency.max(1),
        }
    }

    pub fn clone_root(&self) -> &Path {
        &self.clone_root
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Working copy location for a repository name
    pub fn repo_dir(&self, name: &str) -> PathBuf {
        self.clone_root.join(name)
    }

    /// Runs `job` to completion and returns one outcome per target, in target order
    ///
    /// At most `concurrency` targets are in flight; every git invocation is
    /// scoped to its own target's directory.
    pub async fn run(&self, job: &BatchJob, sink: &dyn ProgressSink) -> BatchReport {
        let start_time = Instant::now();
        let total = job.targets.len();
        let progress = BatchProgress::new(sink, total, job.operation.phases());
        let semaphore = Semaphore::new(self.concurrency);

        tracing::info!(
            operation = job.operation.label(),
            targets = total,
            concurrency = self.concurrency,
            "Starting batch"
        );

        let mut futures = FuturesUnordered::new();
        for (index, target) in job.targets.iter().enumerate() {
            let semaphore = &semaphore;
            let progress = &progress;
            let operation = &job.operation;

            futures.push(async move {
                let mut target_progress = TargetProgress {
                    batch: progress,
                    phases: operation.phases(),
                    reported: 0,
                };

                let outcome = match semaphore.acquire().await {
                    Ok(_permit) => self.run_target(operation, target, &mut target_progress).await,
                    Err(e) => PerTargetOutcome::new(
                        &target.name,
                        OutcomeStatus::Failed(format!("semaphore error: {e}")),
                        "",
                    ),
                };
                target_progress.finish();
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<PerTargetOutcome>> = vec![None; total];
        while let Some((index, outcome)) = futures.next().await {
            slots[index] = Some(outcome);
        }
        drop(futures);
        progress.finish();

        let outcomes: Vec<PerTargetOutcome> = slots.into_iter().flatten().collect();
        let report = BatchReport::new(job.operation.label(), outcomes, start_time.elapsed());
        tracing::info!(
            operation = job.operation.label(),
            ok = report.succeeded(),
            skipped = report.skipped(),
            failed = report.failed_count(),
            "Batch finished"
        );
        report
    }

    async fn run_target(
        &self,
        operation: &Operation,
        target: &RepositoryRecord,
        progress: &mut TargetProgress<'_, '_>,
    ) -> PerTargetOutcome {
        let name = target.name.as_str();

        if let Operation::Clone = operation {
            return self.clone_target(target).await;
        }

        let dir = self.repo_dir(name);
        if !has_git_metadata(&dir) {
            tracing::info!(repo = name, path = %dir.display(), "Not a git repository, skipping");
            return PerTargetOutcome::new(name, OutcomeStatus::SkippedNotAGitRepo, "no .git directory");
        }

        tracing::info!(repo = name, operation = operation.label(), "Processing repository");
        let git = self.git.as_ref();
        let result = match operation {
            Operation::Clone => Err("clone does not run inside a working copy".to_string()),
            Operation::SyncBranch { branch } => sync_branch(git, &dir, branch).await,
            Operation::EnsureBranch {
                new_branch,
                base_branch,
            } => ensure_branch(git, &dir, name, new_branch, base_branch).await,
            Operation::CommitPush { branch, message } => {
                commit_push(git, &dir, branch, message, progress).await
            }
        };

        match result {
            Ok(message) => PerTargetOutcome::new(name, OutcomeStatus::Success, message),
            Err(reason) => {
                tracing::error!(repo = name, operation = operation.label(), "{reason}");
                PerTargetOutcome::new(name, OutcomeStatus::Failed(reason), "")
            }
        }
    }

    async fn clone_target(&self, target: &RepositoryRecord) -> PerTargetOutcome {
        let name = target.name.as_str();

        if !target.has_known_origin() {
            let reason = "no origin URL recorded".to_string();
            tracing::error!(repo = name, "Cannot clone: {reason}");
            return PerTargetOutcome::new(name, OutcomeStatus::Failed(reason), "");
        }

        let dest = self.repo_dir(name);
        if is_non_empty_dir(&dest) {
            tracing::warn!(repo = name, path = %dest.display(), "Clone destination already exists");
            return PerTargetOutcome::new(
                name,
                OutcomeStatus::SkippedAlreadyExists,
                "destination already exists",
            );
        }

        if let Err(e) = std::fs::create_dir_all(&self.clone_root) {
            let reason = format!("cannot create clone root: {e}");
            tracing::error!(repo = name, "{reason}");
            return PerTargetOutcome::new(name, OutcomeStatus::Failed(reason), "");
        }

        tracing::info!(repo = name, url = %target.origin, "Cloning repository");
        match clone_repository(self.git.as_ref(), &self.clone_root, &target.origin, name).await {
            Ok(output) if output.success => {
                PerTargetOutcome::new(name, OutcomeStatus::Success, "cloned")
            }
            Ok(output) if output.stderr.contains("already exists") => {
                tracing::warn!(repo = name, "Clone destination already exists");
                PerTargetOutcome::new(
                    name,
                    OutcomeStatus::SkippedAlreadyExists,
                    "destination already exists",
                )
            }
            Ok(output) => {
                let reason = format!("clone failed: {}", output.failure_reason());
                tracing::error!(repo = name, "{reason}");
                PerTargetOutcome::new(name, OutcomeStatus::Failed(reason), "")
            }
            Err(e) => {
                let reason = format!("clone error: {e}");
                tracing::error!(repo = name, "{reason}");
                PerTargetOutcome::new(name, OutcomeStatus::Failed(reason), "")
            }
        }
    }
}

/// Fast-forwards `branch` to the latest remote state
async fn sync_branch(git: &dyn GitClient, dir: &Path, branch: &str) -> Result<String, String> {
    checkout(git, dir, branch).await?;
    pull(git, dir).await?;
    Ok(format!("{branch} up to date"))
}

/// Idempotent branch creation; existence is checked against local heads only
async fn ensure_branch(
    git: &dyn GitClient,
    dir: &Path,
    name: &str,
    new_branch: &str,
    base_branch: &str,
) -> Result<String, String> {
    if local_branch_exists(git, dir, new_branch).await? {
        checkout(git, dir, new_branch).await?;
        pull(git, dir).await?;
        tracing::info!(repo = name, branch = new_branch, "Branch already exists");
        return Ok(format!("{new_branch} already exists"));
    }

    checkout(git, dir, base_branch).await?;
    pull(git, dir).await?;
    create_branch(git, dir, new_branch, base_branch).await?;
    push_set_upstream(git, dir, new_branch).await?;
    // Pick up anything server-side hooks added on push
    pull(git, dir).await?;
    tracing::info!(repo = name, branch = new_branch, base = base_branch, "Branch created");
    Ok(format!("{new_branch} created from {base_branch}"))
}

/// Checkout, stage, commit and push; reports one progress step per phase
async fn commit_push(
    git: &dyn GitClient,
    dir: &Path,
    branch: &str,
    message: &str,
    progress: &mut TargetProgress<'_, '_>,
) -> Result<String, String> {
    checkout(git, dir, branch).await?;
    progress.phase_done();
    stage_all(git, dir).await?;
    progress.phase_done();
    commit(git, dir, message).await?;
    progress.phase_done();
    push_branch(git, dir, branch).await?;
    progress.phase_done();
    Ok(format!("committed & pushed to {branch}"))
}

fn is_non_empty_dir(path: &Path) -> bool {
    match std::fs::read_dir(path) {
        Ok(mut entries) => entries.next().is_some(),
        Err(_) => false,
    }
}
