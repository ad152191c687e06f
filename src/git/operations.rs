//! Git command execution scoped to an explicit working directory

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

use crate::core::config::DEFAULT_GIT_TIMEOUT_SECS;

// Git command arguments
const GIT_PULL_ARGS: &[&str] = &["pull"];
const GIT_ADD_ALL_ARGS: &[&str] = &["add", "."];
const GIT_SHOW_REF_HEADS_ARGS: &[&str] = &["show-ref", "--quiet", "--heads"];

/// Result of a single named git step; the error is a display-ready reason
pub type StepResult = std::result::Result<GitOutput, String>;

/// Captured result of one git invocation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GitOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    /// Best single-line description of why the invocation failed
    pub fn failure_reason(&self) -> String {
        let text = if self.stderr.is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        if text.is_empty() {
            "git exited with non-zero status".to_string()
        } else {
            text.to_string()
        }
    }
}

/// Something that can run `git <args>` inside a given directory
///
/// Every invocation receives its working directory explicitly; nothing relies
/// on the process-wide current directory, so targets can run in parallel.
#[async_trait]
pub trait GitClient: Send + Sync {
    async fn run(&self, dir: &Path, args: &[&str]) -> Result<GitOutput>;
}

/// Git client that shells out to the `git` binary on `PATH`
#[derive(Clone, Debug)]
pub struct SystemGit {
    timeout: Duration,
}

impl SystemGit {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SystemGit {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_GIT_TIMEOUT_SECS))
    }
}

#[async_trait]
impl GitClient for SystemGit {
    async fn run(&self, dir: &Path, args: &[&str]) -> Result<GitOutput> {
        tracing::debug!(dir = %dir.display(), "git {}", args.join(" "));

        let result = tokio::time::timeout(
            self.timeout,
            Command::new("git")
                .args(args)
                .current_dir(dir)
                .kill_on_drop(true)
                .output(),
        )
        .await;

        match result {
            Ok(Ok(output)) => Ok(GitOutput {
                success: output.status.success(),
                stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(anyhow::anyhow!(
                "Git operation timed out after {} seconds",
                self.timeout.as_secs()
            )),
        }
    }
}

/// Runs one git step and collapses spawn errors and non-zero exits into a
/// single failure message prefixed with the step name
pub async fn run_step(
    git: &dyn GitClient,
    dir: &Path,
    step: &str,
    args: &[&str],
) -> StepResult {
    match git.run(dir, args).await {
        Ok(output) if output.success => Ok(output),
        Ok(output) => Err(format!("{step} failed: {}", output.failure_reason())),
        Err(e) => Err(format!("{step} error: {e}")),
    }
}

/// `git clone -- <url> <name>` run from the clone root
pub async fn clone_repository(
    git: &dyn GitClient,
    clone_root: &Path,
    url: &str,
    name: &str,
) -> Result<GitOutput> {
    git.run(clone_root, &["clone", "--", url, name]).await
}

/// `git checkout <ref>`
pub async fn checkout(git: &dyn GitClient, dir: &Path, reference: &str) -> StepResult {
    run_step(git, dir, "checkout", &["checkout", reference]).await
}

/// `git pull`
pub async fn pull(git: &dyn GitClient, dir: &Path) -> StepResult {
    run_step(git, dir, "pull", GIT_PULL_ARGS).await
}

/// `git checkout -b <new> <base>`
pub async fn create_branch(
    git: &dyn GitClient,
    dir: &Path,
    new_branch: &str,
    base_branch: &str,
) -> StepResult {
    run_step(git, dir, "create branch", &["checkout", "-b", new_branch, base_branch]).await
}

/// `git push -u origin <branch>`
pub async fn push_set_upstream(
    git: &dyn GitClient,
    dir: &Path,
    branch: &str,
) -> StepResult {
    run_step(git, dir, "push", &["push", "-u", "origin", branch]).await
}

/// `git push origin <branch>`
pub async fn push_branch(git: &dyn GitClient, dir: &Path, branch: &str) -> StepResult {
    run_step(git, dir, "push", &["push", "origin", branch]).await
}

/// `git add .`
pub async fn stage_all(git: &dyn GitClient, dir: &Path) -> StepResult {
    run_step(git, dir, "add", GIT_ADD_ALL_ARGS).await
}

/// `git commit -m <message>`
pub async fn commit(git: &dyn GitClient, dir: &Path, message: &str) -> StepResult {
    run_step(git, dir, "commit", &["commit", "-m", message]).await
}

/// Checks whether `branch` exists as a local head
///
/// Uses `git show-ref --quiet --heads <branch>`; the exit code is the answer.
/// Remote-only branches are reported as absent.
pub async fn local_branch_exists(
    git: &dyn GitClient,
    dir: &Path,
    branch: &str,
) -> std::result::Result<bool, String> {
    let mut args = Vec::from(GIT_SHOW_REF_HEADS_ARGS);
    args.push(branch);
    match git.run(dir, &args).await {
        Ok(output) => Ok(output.success),
        Err(e) => Err(format!("branch check error: {e}")),
    }
}

/// Whether `dir` carries version-control metadata (`.git` directory or file)
pub fn has_git_metadata(dir: &Path) -> bool {
    dir.join(crate::core::config::GIT_METADATA_DIR).exists()
}
