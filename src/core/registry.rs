//! Durable registry of known repositories (name → origin URL)

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::config::UNKNOWN_ORIGIN;
use crate::error::ValidationError;

/// Persisted mapping of repository name to origin URL
pub type RepositoryMap = BTreeMap<String, String>;

/// One registered repository
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryRecord {
    pub name: String,
    /// Origin URL, or [`UNKNOWN_ORIGIN`] for repositories found by scanning
    pub origin: String,
}

impl RepositoryRecord {
    pub fn new(name: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: origin.into(),
        }
    }

    pub fn has_known_origin(&self) -> bool {
        self.origin != UNKNOWN_ORIGIN
    }
}

/// JSON-file backed registry; every mutation rewrites the whole file
#[derive(Clone, Debug)]
pub struct Registry {
    path: PathBuf,
}

impl Registry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted mapping; a missing file is an empty registry
    pub fn load(&self) -> Result<RepositoryMap> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %self.path.display(), "No registry file found, starting empty");
                return Ok(RepositoryMap::new());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read registry {}", self.path.display())
                })
            }
        };

        if raw.trim().is_empty() {
            return Ok(RepositoryMap::new());
        }

        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse registry {}", self.path.display()))
    }

    /// Overwrites the persisted mapping via a temp file in the same directory
    pub fn save(&self, map: &RepositoryMap) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create registry directory {}", dir.display()))?;

        let mut temp = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        let json = serde_json::to_string_pretty(map).context("Failed to serialize registry")?;
        writeln!(temp, "{json}").context("Failed to write registry temp file")?;
        temp.as_file()
            .sync_all()
            .context("Failed to flush registry temp file")?;
        temp.persist(&self.path)
            .with_context(|| format!("Failed to replace registry {}", self.path.display()))?;
        Ok(())
    }

    /// All records sorted by name
    pub fn records(&self) -> Result<Vec<RepositoryRecord>> {
        Ok(self
            .load()?
            .into_iter()
            .map(|(name, origin)| RepositoryRecord::new(name, origin))
            .collect())
    }

    /// Looks up a single record
    pub fn get(&self, name: &str) -> Result<Option<RepositoryRecord>> {
        Ok(self
            .load()?
            .get(name)
            .map(|origin| RepositoryRecord::new(name, origin.clone())))
    }

    /// Registers `url` under its derived name (upsert) and returns the name
    ///
    /// Does not clone; the caller decides when to fetch the working copy.
    pub fn add(&self, url: &str) -> Result<String> {
        let name = derive_repository_name(url)?;
        let mut map = self.load()?;
        if let Some(previous) = map.insert(name.clone(), url.trim().to_string()) {
            if previous != url.trim() {
                tracing::info!(repo = %name, "Updated origin from {previous} to {}", url.trim());
            }
        }
        self.save(&map)?;
        tracing::info!(repo = %name, "Registered repository");
        Ok(name)
    }

    /// Deletes a record; returns whether it existed
    pub fn remove(&self, name: &str) -> Result<bool> {
        let mut map = self.load()?;
        let existed = map.remove(name).is_some();
        if existed {
            self.save(&map)?;
            tracing::info!(repo = %name, "Removed repository from registry");
        }
        Ok(existed)
    }

    /// Registers every directory under `clone_root` the registry does not yet
    /// know, with origin [`UNKNOWN_ORIGIN`]; returns the inserted names
    pub fn reconcile_with_disk(&self, clone_root: &Path) -> Result<Vec<String>> {
        fs::create_dir_all(clone_root)
            .with_context(|| format!("Failed to create clone root {}", clone_root.display()))?;

        let mut map = self.load()?;
        let mut inserted = Vec::new();

        let entries = fs::read_dir(clone_root)
            .with_context(|| format!("Failed to list clone root {}", clone_root.display()))?;
        for entry in entries {
            let entry = entry
                .with_context(|| format!("Failed to list clone root {}", clone_root.display()))?;
            if !entry.path().is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::warn!(path = %entry.path().display(), "Skipping non UTF-8 directory name");
                continue;
            };
            if name.starts_with('.') || map.contains_key(&name) {
                continue;
            }
            map.insert(name.clone(), UNKNOWN_ORIGIN.to_string());
            tracing::info!(repo = %name, "Added repository found on disk");
            inserted.push(name);
        }

        if !inserted.is_empty() {
            inserted.sort();
            self.save(&map)?;
        }
        Ok(inserted)
    }
}

/// Derives a repository name from the URL's final path segment, minus `.git`
pub fn derive_repository_name(url: &str) -> std::result::Result<String, ValidationError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidInput("repository URL is empty".to_string()));
    }

    let without_trailing = trimmed.trim_end_matches(['/', '\\']);
    let segment = without_trailing
        .rsplit(['/', '\\', ':'])
        .next()
        .unwrap_or(without_trailing);
    let name = segment.strip_suffix(".git").unwrap_or(segment);

    if name.is_empty() || name == "." || name == ".." {
        return Err(ValidationError::InvalidInput(format!(
            "cannot derive a repository name from '{trimmed}'"
        )));
    }
    Ok(name.to_string())
}
