//! Payload directory resolution for a repository working copy

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::config::{EXCLUDED_PAYLOAD_DIRS, PAYLOAD_SOURCE_DIR, PAYLOAD_WRAPPER_DIR};

/// The single directory of a repository that gets staged
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedModule {
    pub repository: String,
    /// Directory the candidates were listed from (`…/src`)
    pub source_root: PathBuf,
    pub payload_dir: PathBuf,
}

/// Result of applying the resolution heuristic to one repository
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedModule),
    /// No `src` directory where one was expected
    NoSourceDir { searched: PathBuf },
    /// `src` exists but every subdirectory was excluded (or there were none)
    NoCandidates { source_root: PathBuf },
}

impl Resolution {
    pub fn module(&self) -> Option<&ResolvedModule> {
        match self {
            Resolution::Resolved(module) => Some(module),
            _ => None,
        }
    }
}

/// Locates the payload directory of `repository` rooted at `repo_root`
///
/// 1. descend into `transforms-python/` when present
/// 2. descend into `src/`, or give up
/// 3. list subdirectories, dropping test and cache directories
/// 4. pick the first remaining entry in name order
///
/// More than one remaining entry is logged as ambiguous.
pub fn resolve_payload(repository: &str, repo_root: &Path) -> Result<Resolution> {
    let mut root = repo_root.to_path_buf();

    let wrapper = root.join(PAYLOAD_WRAPPER_DIR);
    if wrapper.is_dir() {
        root = wrapper;
    }

    let source_root = root.join(PAYLOAD_SOURCE_DIR);
    if !source_root.is_dir() {
        tracing::warn!(repo = repository, path = %source_root.display(), "No src directory, nothing to stage");
        return Ok(Resolution::NoSourceDir {
            searched: source_root,
        });
    }

    let candidates = payload_candidates(&source_root)?;
    let Some(first) = candidates.first() else {
        tracing::warn!(repo = repository, path = %source_root.display(), "No payload candidate under src");
        return Ok(Resolution::NoCandidates { source_root });
    };

    if candidates.len() > 1 {
        tracing::warn!(
            repo = repository,
            chosen = %first,
            candidates = %candidates.join(", "),
            "Several payload candidates under src, using the first"
        );
    }

    let payload_dir = source_root.join(first);
    tracing::info!(repo = repository, payload = %payload_dir.display(), "Resolved payload");
    Ok(Resolution::Resolved(ResolvedModule {
        repository: repository.to_string(),
        source_root,
        payload_dir,
    }))
}

/// Subdirectory names of `source_root` that may be a payload, sorted by name
pub fn payload_candidates(source_root: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(source_root)
        .with_context(|| format!("Failed to list {}", source_root.display()))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list {}", source_root.display()))?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if EXCLUDED_PAYLOAD_DIRS.contains(&name.as_str()) {
            continue;
        }
        candidates.push(name);
    }
    candidates.sort();
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mkdirs(root: &Path, dirs: &[&str]) {
        for dir in dirs {
            fs::create_dir_all(root.join(dir)).expect("Failed to create directory");
        }
    }

    #[test]
    fn test_excluded_directories_are_filtered() {
        let temp_dir = TempDir::new().unwrap();
        mkdirs(temp_dir.path(), &["src/pkg1", "src/tests", "src/__pycache__"]);

        let resolution = resolve_payload("repo", temp_dir.path()).unwrap();
        let module = resolution.module().expect("Should resolve");
        assert_eq!(module.payload_dir, temp_dir.path().join("src").join("pkg1"));
        assert_eq!(module.source_root, temp_dir.path().join("src"));
        assert_eq!(module.repository, "repo");
    }

    #[test]
    fn test_transforms_python_wrapper_is_descended() {
        let temp_dir = TempDir::new().unwrap();
        mkdirs(temp_dir.path(), &["transforms-python/src/myproject", "src/decoy"]);

        let resolution = resolve_payload("repo", temp_dir.path()).unwrap();
        assert_eq!(
            resolution.module().unwrap().payload_dir,
            temp_dir.path().join("transforms-python/src/myproject")
        );
    }

    #[test]
    fn test_wrapper_without_src_does_not_fall_back() {
        let temp_dir = TempDir::new().unwrap();
        mkdirs(temp_dir.path(), &["transforms-python/other", "src/pkg"]);

        let resolution = resolve_payload("repo", temp_dir.path()).unwrap();
        assert_eq!(
            resolution,
            Resolution::NoSourceDir {
                searched: temp_dir.path().join("transforms-python").join("src")
            }
        );
    }

    #[test]
    fn test_missing_src_contributes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        mkdirs(temp_dir.path(), &["lib/pkg"]);

        let resolution = resolve_payload("repo", temp_dir.path()).unwrap();
        assert!(matches!(resolution, Resolution::NoSourceDir { .. }));
        assert!(resolution.module().is_none());
    }

    #[test]
    fn test_only_excluded_or_files_yields_no_candidates() {
        let temp_dir = TempDir::new().unwrap();
        mkdirs(temp_dir.path(), &["src/test", "src/expectations", "src/.ruff_cache"]);
        fs::write(temp_dir.path().join("src/module.py"), "x = 1").unwrap();

        let resolution = resolve_payload("repo", temp_dir.path()).unwrap();
        assert!(matches!(resolution, Resolution::NoCandidates { .. }));
    }

    #[test]
    fn test_choice_is_deterministic_with_several_candidates() {
        let temp_dir = TempDir::new().unwrap();
        mkdirs(temp_dir.path(), &["src/zeta", "src/alpha", "src/mid"]);

        for _ in 0..3 {
            let resolution = resolve_payload("repo", temp_dir.path()).unwrap();
            assert_eq!(
                resolution.module().unwrap().payload_dir,
                temp_dir.path().join("src").join("alpha")
            );
        }
        assert_eq!(
            payload_candidates(&temp_dir.path().join("src")).unwrap(),
            vec!["alpha", "mid", "zeta"]
        );
    }
}
