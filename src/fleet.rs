//! Orchestration facade
//!
//! Composes the registry, the git batch operator and the staging engine into
//! the user-facing actions. Validation happens before any side effect; per
//! repository failures land in the returned reports; only environment failures
//! (registry I/O, staging root creation) come back as `Err`.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::core::config::Settings;
use crate::core::progress::ProgressSink;
use crate::core::registry::{Registry, RepositoryRecord};
use crate::core::stats::BatchReport;
use crate::error::{require_distinct, require_non_empty, require_not_option, ValidationError};
use crate::git::batch::{BatchJob, BatchOperator, Operation};
use crate::git::operations::GitClient;
use crate::modules::stage::{stage_modules, StageReport};

/// Sub-directories recreated under the docs root before a documentation build
const DOCS_SCAFFOLD: &[&str] = &["source", "build"];

/// What `remove_repository` managed to delete besides the registry record
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemovalReport {
    pub name: String,
    pub clone_removed: bool,
    pub staged_removed: bool,
}

/// One workspace: its registry, clone root and staging tree
pub struct Fleet {
    settings: Settings,
    registry: Registry,
    operator: BatchOperator,
}

impl Fleet {
    /// Opens the workspace and registers any working copy found on disk that
    /// the registry does not know yet
    pub fn open(settings: Settings, git: Arc<dyn GitClient>, concurrency: usize) -> Result<Self> {
        let registry = Registry::new(&settings.registry_path);
        let discovered = registry
            .reconcile_with_disk(&settings.clone_root)
            .context("Failed to reconcile registry with clone root")?;
        if !discovered.is_empty() {
            tracing::info!(count = discovered.len(), names = %discovered.join(", "), "Registered repositories found on disk");
        }

        let operator = BatchOperator::new(git, &settings.clone_root, concurrency);
        Ok(Self {
            settings,
            registry,
            operator,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// All registered repositories, sorted by name
    pub fn repositories(&self) -> Result<Vec<RepositoryRecord>> {
        self.registry.records()
    }

    /// Registers `url` and clones it; an existing working copy is tolerated
    pub async fn add_repository(
        &self,
        url: &str,
        sink: &dyn ProgressSink,
    ) -> Result<(String, BatchReport)> {
        let name = self.registry.add(url)?;
        let record = self
            .registry
            .get(&name)?
            .ok_or_else(|| ValidationError::UnknownRepository(name.clone()))?;

        let job = BatchJob::new(Operation::Clone, vec![record]);
        let report = self.operator.run(&job, sink).await;
        Ok((name, report))
    }

    /// Forgets a repository and deletes its working copy and staged module
    ///
    /// Both deletions are best-effort; the record is removed either way.
    pub fn remove_repository(&self, name: &str) -> Result<RemovalReport> {
        require_non_empty("name", name)?;
        if self.registry.get(name)?.is_none() {
            return Err(ValidationError::UnknownRepository(name.to_string()).into());
        }

        let clone_removed = remove_dir_logged(name, &self.settings.clone_root.join(name));
        let staged_removed = remove_dir_logged(name, &self.settings.staging_root.join(name));
        self.registry.remove(name)?;

        Ok(RemovalReport {
            name: name.to_string(),
            clone_removed,
            staged_removed,
        })
    }

    /// Checks out `branch` and pulls in every registered repository
    pub async fn update_all(&self, branch: &str, sink: &dyn ProgressSink) -> Result<BatchReport> {
        require_non_empty("branch", branch)?;
        require_not_option("branch", branch)?;
        let job = BatchJob::new(
            Operation::SyncBranch {
                branch: branch.trim().to_string(),
            },
            self.repositories()?,
        );
        Ok(self.operator.run(&job, sink).await)
    }

    /// Makes sure `new_branch` exists everywhere, creating it from `base_branch`
    pub async fn branch_all(
        &self,
        new_branch: &str,
        base_branch: &str,
        sink: &dyn ProgressSink,
    ) -> Result<BatchReport> {
        require_non_empty("new branch", new_branch)?;
        require_non_empty("base branch", base_branch)?;
        require_not_option("new branch", new_branch)?;
        require_not_option("base branch", base_branch)?;
        require_distinct("new branch", new_branch, "base branch", base_branch)?;

        let job = BatchJob::new(
            Operation::EnsureBranch {
                new_branch: new_branch.trim().to_string(),
                base_branch: base_branch.trim().to_string(),
            },
            self.repositories()?,
        );
        Ok(self.operator.run(&job, sink).await)
    }

    /// Commits all working-tree changes on `branch` and pushes, everywhere
    pub async fn commit_all(
        &self,
        branch: &str,
        message: &str,
        sink: &dyn ProgressSink,
    ) -> Result<BatchReport> {
        require_non_empty("message", message)?;
        require_non_empty("branch", branch)?;
        require_not_option("branch", branch)?;
        require_distinct("message", message, "branch", branch)?;

        let job = BatchJob::new(
            Operation::CommitPush {
                branch: branch.trim().to_string(),
                message: message.to_string(),
            },
            self.repositories()?,
        );
        Ok(self.operator.run(&job, sink).await)
    }

    /// Rebuilds the staging tree from the given repositories (all registered
    /// ones when `names` is `None`) and resets the documentation scaffold
    pub fn prepare_doc_build(
        &self,
        names: Option<&[String]>,
        sink: &dyn ProgressSink,
    ) -> Result<StageReport> {
        let registered = self.registry.load()?;
        let names: Vec<String> = match names {
            Some(names) => {
                let mut seen = HashSet::new();
                for name in names {
                    if !registered.contains_key(name) {
                        return Err(ValidationError::UnknownRepository(name.clone()).into());
                    }
                    if !seen.insert(name.as_str()) {
                        return Err(ValidationError::DuplicateName(name.clone()).into());
                    }
                }
                names.to_vec()
            }
            None => registered.keys().cloned().collect(),
        };

        let staging_root = &self.settings.staging_root;
        reset_dir(staging_root)
            .with_context(|| format!("Failed to reset staging root {}", staging_root.display()))?;

        let report = stage_modules(&self.settings.clone_root, &names, staging_root, sink)?;

        reset_docs_scaffold(&self.settings.docs_root)?;
        Ok(report)
    }
}

fn remove_dir_logged(name: &str, path: &Path) -> bool {
    if !path.exists() {
        tracing::debug!(repo = name, path = %path.display(), "Nothing to delete");
        return false;
    }
    match fs::remove_dir_all(path) {
        Ok(()) => {
            tracing::info!(repo = name, path = %path.display(), "Deleted");
            true
        }
        Err(e) => {
            tracing::warn!(repo = name, path = %path.display(), "Failed to delete: {e}");
            false
        }
    }
}

fn reset_dir(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)?;
    }
    fs::create_dir_all(path)
}

fn reset_docs_scaffold(docs_root: &Path) -> Result<()> {
    reset_dir(docs_root)
        .with_context(|| format!("Failed to reset docs folder {}", docs_root.display()))?;
    for sub in DOCS_SCAFFOLD {
        let dir = docs_root.join(sub);
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    tracing::info!(path = %docs_root.display(), "Reset docs folder");
    Ok(())
}
