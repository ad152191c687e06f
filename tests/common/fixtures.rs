//! Test fixtures and builders

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use repo_fleet::core::Settings;
use repo_fleet::git::SystemGit;
use repo_fleet::Fleet;

use super::git::{create_test_commit, git_stdout, setup_git_repo};

/// A workspace directory with automatic cleanup
pub struct Workspace {
    pub temp_dir: TempDir,
}

impl Workspace {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn settings(&self) -> Settings {
        Settings::for_workspace(self.root())
    }

    pub fn clone_dir(&self, name: &str) -> PathBuf {
        self.settings().clone_root.join(name)
    }

    /// Opens a fleet backed by the real git binary
    pub fn open(&self, concurrency: usize) -> Result<Fleet> {
        let settings = self.settings();
        let git = Arc::new(SystemGit::new(settings.git_timeout));
        Fleet::open(settings, git, concurrency)
    }

    /// Writes a file into a working copy under the clone root
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.settings().clone_root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }
}

/// A bare repository acting as `origin`, seeded through a scratch clone
pub struct TestRemote {
    pub temp_dir: TempDir,
    pub name: String,
}

impl TestRemote {
    /// Path of the bare repository, usable as a clone URL
    pub fn url(&self) -> String {
        self.bare_path().to_string_lossy().to_string()
    }

    pub fn bare_path(&self) -> PathBuf {
        self.temp_dir.path().join(format!("{}.git", self.name))
    }

    /// Branch names on the remote
    pub fn branches(&self) -> Result<Vec<String>> {
        let listing = git_stdout(&self.bare_path(), &["for-each-ref", "--format=%(refname:short)", "refs/heads"])?;
        Ok(listing.lines().map(str::to_string).collect())
    }

    /// Subject of the newest commit on `branch`
    pub fn last_subject(&self, branch: &str) -> Result<String> {
        git_stdout(&self.bare_path(), &["log", "-1", "--format=%s", branch])
    }
}

/// Builder for bare remotes with a `main` branch
pub struct RemoteBuilder {
    name: String,
    files: Vec<(String, String)>,
}

impl RemoteBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: vec![("README.md".to_string(), "# Test Repo".to_string())],
        }
    }

    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.push((path.into(), content.into()));
        self
    }

    pub fn build(self) -> Result<TestRemote> {
        let temp_dir = TempDir::new()?;
        let bare = temp_dir.path().join(format!("{}.git", self.name));
        std::fs::create_dir_all(&bare)?;
        git_stdout(&bare, &["init", "--quiet", "--bare"])?;
        git_stdout(&bare, &["symbolic-ref", "HEAD", "refs/heads/main"])?;

        let seed = temp_dir.path().join("seed");
        std::fs::create_dir_all(&seed)?;
        setup_git_repo(&seed)?;
        for (path, content) in &self.files {
            create_test_commit(&seed, path, content, &format!("Add {path}"))?;
        }
        git_stdout(&seed, &["remote", "add", "origin", &bare.to_string_lossy()])?;
        git_stdout(&seed, &["push", "--quiet", "origin", "main"])?;

        Ok(TestRemote {
            temp_dir,
            name: self.name,
        })
    }
}
