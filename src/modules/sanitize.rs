//! Post-copy sanitation of the staging tree

use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};

/// Deletes every file under `root` whose name is exactly one of `names`
///
/// Directories are never touched, and names match exactly (no globbing, case
/// sensitive). Files that cannot be removed are logged and skipped. Returns the
/// paths that were removed.
pub fn remove_named_files(root: &Path, names: &[&str]) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }

    let matches: Vec<PathBuf> = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .build()
        .filter_map(|result| match result {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry during sanitation: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| names.contains(&name))
        })
        .map(|entry| entry.into_path())
        .collect();

    let mut removed = Vec::with_capacity(matches.len());
    for path in matches {
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed sanitized file");
                removed.push(path);
            }
            Err(e) => tracing::warn!(path = %path.display(), "Failed to remove file: {e}"),
        }
    }
    tracing::info!(
        removed = removed.len(),
        names = %names.join(", "),
        "Sanitized {}",
        root.display()
    );
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "content").unwrap();
    }

    #[test]
    fn test_removes_exact_names_at_any_depth() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "setup.py");
        touch(root, "a/pipeline.py");
        touch(root, "a/b/c/setup.py");
        touch(root, "a/b/keep.py");
        touch(root, "a/my_setup.py");
        touch(root, "a/Setup.py");
        touch(root, "a/pipeline.py.bak");
        fs::create_dir_all(root.join("pipeline.py")).unwrap();

        let removed = remove_named_files(root, &["pipeline.py", "setup.py"]);

        assert_eq!(removed.len(), 3);
        assert!(!root.join("setup.py").exists());
        assert!(!root.join("a/pipeline.py").exists());
        assert!(!root.join("a/b/c/setup.py").exists());
        assert!(root.join("a/b/keep.py").exists());
        assert!(root.join("a/my_setup.py").exists());
        assert!(root.join("a/Setup.py").exists());
        assert!(root.join("a/pipeline.py.bak").exists());
        assert!(root.join("pipeline.py").is_dir());
    }

    #[test]
    fn test_missing_root_is_a_no_op() {
        let temp_dir = TempDir::new().unwrap();
        assert!(remove_named_files(&temp_dir.path().join("absent"), &["setup.py"]).is_empty());
    }
}
