//! Staging of resolved payloads from many repositories into one flat tree

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::mirror::mirror_dir;
use super::resolver::{resolve_payload, Resolution};
use super::sanitize::remove_named_files;
use crate::core::config::{NAMESPACE_MARKER_FILE, SANITIZED_FILE_NAMES};
use crate::core::progress::{BatchProgress, ProgressSink};

/// What happened to one repository during staging
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageStatus {
    /// Payload mirrored into `<staging>/<repository>`
    Staged { payload: PathBuf, files: usize },
    /// Resolution found nothing to copy; the repository contributes nothing
    NoPayload(String),
    /// Resolution or copy failed
    Failed(String),
}

impl StageStatus {
    pub fn symbol(&self) -> &str {
        match self {
            StageStatus::Staged { .. } => "🟢",
            StageStatus::NoPayload(_) => "🟠",
            StageStatus::Failed(_) => "🔴",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageOutcome {
    pub repository: String,
    pub status: StageStatus,
}

/// Result of one staging batch
#[derive(Clone, Debug)]
pub struct StageReport {
    pub staging_root: PathBuf,
    pub outcomes: Vec<StageOutcome>,
    /// Files deleted by the sanitation pass
    pub sanitized: Vec<PathBuf>,
    pub duration: Duration,
}

impl StageReport {
    pub fn staged(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, StageStatus::Staged { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, StageStatus::Failed(_)))
            .count()
    }

    pub fn status_of(&self, repository: &str) -> Option<&StageStatus> {
        self.outcomes
            .iter()
            .find(|o| o.repository == repository)
            .map(|o| &o.status)
    }

    pub fn generate_summary(&self) -> String {
        format!(
            "✅ staging completed in {:.1}s • {} staged • {} without payload • {} failed • {} files sanitized",
            self.duration.as_secs_f64(),
            self.staged(),
            self.outcomes.len() - self.staged() - self.failed(),
            self.failed(),
            self.sanitized.len()
        )
    }
}

/// Resolves and mirrors each repository's payload into `staging_root/<name>`,
/// writes the namespace marker, then runs the sanitation pass
///
/// Per-repository problems are recorded and never stop the batch. Only a
/// failure to create the staging root or write the marker file is returned as
/// an error.
pub fn stage_modules(
    clone_root: &Path,
    repositories: &[String],
    staging_root: &Path,
    sink: &dyn ProgressSink,
) -> Result<StageReport> {
    let start_time = Instant::now();
    fs::create_dir_all(staging_root)
        .with_context(|| format!("Failed to create staging root {}", staging_root.display()))?;

    let progress = BatchProgress::new(sink, repositories.len(), 1);
    let mut outcomes = Vec::with_capacity(repositories.len());

    for name in repositories {
        let status = stage_one(clone_root, name, staging_root);
        match &status {
            StageStatus::Staged { files, .. } => {
                tracing::info!(repo = %name, files, "Copied payload to {}", staging_root.display())
            }
            StageStatus::NoPayload(reason) => tracing::warn!(repo = %name, "Skipping: {reason}"),
            StageStatus::Failed(reason) => tracing::error!(repo = %name, "Staging failed: {reason}"),
        }
        outcomes.push(StageOutcome {
            repository: name.clone(),
            status,
        });
        progress.advance(1);
    }

    let marker = staging_root.join(NAMESPACE_MARKER_FILE);
    fs::write(&marker, b"")
        .with_context(|| format!("Failed to write marker file {}", marker.display()))?;

    let sanitized = remove_named_files(staging_root, SANITIZED_FILE_NAMES);
    progress.finish();

    Ok(StageReport {
        staging_root: staging_root.to_path_buf(),
        outcomes,
        sanitized,
        duration: start_time.elapsed(),
    })
}

fn stage_one(clone_root: &Path, name: &str, staging_root: &Path) -> StageStatus {
    let resolution = match resolve_payload(name, &clone_root.join(name)) {
        Ok(resolution) => resolution,
        Err(e) => return StageStatus::Failed(format!("{e:#}")),
    };

    let module = match resolution {
        Resolution::Resolved(module) => module,
        Resolution::NoSourceDir { searched } => {
            return StageStatus::NoPayload(format!("no source directory at {}", searched.display()))
        }
        Resolution::NoCandidates { source_root } => {
            return StageStatus::NoPayload(format!(
                "no payload directory under {}",
                source_root.display()
            ))
        }
    };

    match mirror_dir(&module.payload_dir, &staging_root.join(name)) {
        Ok(stats) => StageStatus::Staged {
            payload: module.payload_dir,
            files: stats.files_copied,
        },
        Err(e) => StageStatus::Failed(format!("{e:#}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::progress::tests::RecordingSink;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, relative).unwrap();
    }

    #[test]
    fn test_stage_mixed_repositories() {
        let temp_dir = TempDir::new().unwrap();
        let clone_root = temp_dir.path().join("remote_repositories");
        let staging = temp_dir.path().join("local_modules");
        write(&clone_root, "Alpha/src/alpha_pkg/core.py");
        write(&clone_root, "Alpha/src/alpha_pkg/setup.py");
        write(&clone_root, "Alpha/src/tests/test_core.py");
        write(&clone_root, "Beta/transforms-python/src/beta_pkg/pipeline.py");
        write(&clone_root, "Beta/transforms-python/src/beta_pkg/transform.py");
        write(&clone_root, "Gamma/README.md");

        let names = vec!["Alpha".to_string(), "Beta".to_string(), "Gamma".to_string()];
        let sink = RecordingSink::default();
        let report = stage_modules(&clone_root, &names, &staging, &sink).unwrap();

        assert!(staging.join("Alpha/core.py").is_file());
        assert!(!staging.join("Alpha/setup.py").exists());
        assert!(!staging.join("Alpha/test_core.py").exists());
        assert!(staging.join("Beta/transform.py").is_file());
        assert!(!staging.join("Beta/pipeline.py").exists());
        assert!(!staging.join("Gamma").exists());
        assert!(staging.join("__init__.py").is_file());

        assert!(matches!(report.status_of("Alpha"), Some(StageStatus::Staged { files: 2, .. })));
        assert!(matches!(report.status_of("Gamma"), Some(StageStatus::NoPayload(_))));
        assert_eq!(report.sanitized.len(), 2);
        assert_eq!(report.staged(), 2);
        assert_eq!(sink.last(), Some(1.0));
    }

    #[test]
    fn test_unknown_repository_does_not_abort_batch() {
        let temp_dir = TempDir::new().unwrap();
        let clone_root = temp_dir.path().join("remote_repositories");
        let staging = temp_dir.path().join("local_modules");
        write(&clone_root, "Real/src/pkg/a.py");

        let names = vec!["Missing".to_string(), "Real".to_string()];
        let report = stage_modules(&clone_root, &names, &staging, &crate::core::progress::NoProgress)
            .unwrap();

        assert!(matches!(report.status_of("Missing"), Some(StageStatus::NoPayload(_))));
        assert!(staging.join("Real/a.py").is_file());
        assert!(!staging.join("Missing").exists());
        assert_eq!(report.staged(), 1);
    }

    #[test]
    fn test_restaging_replaces_previous_contents() {
        let temp_dir = TempDir::new().unwrap();
        let clone_root = temp_dir.path().join("remote_repositories");
        let staging = temp_dir.path().join("local_modules");
        write(&clone_root, "Repo/src/pkg/old.py");
        let names = vec!["Repo".to_string()];

        stage_modules(&clone_root, &names, &staging, &crate::core::progress::NoProgress).unwrap();
        assert!(staging.join("Repo/old.py").exists());

        fs::remove_file(clone_root.join("Repo/src/pkg/old.py")).unwrap();
        write(&clone_root, "Repo/src/pkg/new.py");
        stage_modules(&clone_root, &names, &staging, &crate::core::progress::NoProgress).unwrap();

        assert!(!staging.join("Repo/old.py").exists());
        assert!(staging.join("Repo/new.py").exists());
    }

    #[test]
    fn test_empty_batch_still_writes_marker() {
        let temp_dir = TempDir::new().unwrap();
        let staging = temp_dir.path().join("local_modules");
        let sink = RecordingSink::default();

        let report = stage_modules(temp_dir.path(), &[], &staging, &sink).unwrap();
        assert!(report.outcomes.is_empty());
        assert!(staging.join("__init__.py").is_file());
        assert_eq!(sink.values(), vec![1.0]);
    }
}
