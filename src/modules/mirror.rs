//! Mirror copy: make a destination tree identical to a source tree

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EntryKind {
    Dir,
    File,
}

/// Counts from one mirror pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MirrorStats {
    pub files_copied: usize,
    pub dirs_created: usize,
    pub entries_removed: usize,
}

/// Lists every entry under `root` (excluding `root` itself) as relative paths,
/// parents before children
///
/// No ignore rules apply: hidden files and gitignored files are part of the tree.
/// Symlinks are followed, so a linked directory is listed with its contents and
/// a linked file as a file. Dangling links and link cycles are skipped.
fn list_tree(root: &Path) -> Result<Vec<(PathBuf, EntryKind)>> {
    let mut entries = Vec::new();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) if is_unresolvable_link(&e) => {
                tracing::warn!(root = %root.display(), "Skipping unresolvable link: {e}");
                continue;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to walk {}", root.display()));
            }
        };
        if entry.depth() == 0 {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("Entry {} escaped {}", entry.path().display(), root.display()))?
            .to_path_buf();
        let kind = if entry.file_type().is_some_and(|ft| ft.is_dir()) {
            EntryKind::Dir
        } else {
            EntryKind::File
        };
        entries.push((relative, kind));
    }
    Ok(entries)
}

/// Dangling symlink (target missing) or a link that loops back to an ancestor
fn is_unresolvable_link(err: &ignore::Error) -> bool {
    match err {
        ignore::Error::Loop { .. } => true,
        ignore::Error::WithPath { err, .. }
        | ignore::Error::WithDepth { err, .. }
        | ignore::Error::WithLineNumber { err, .. } => is_unresolvable_link(err),
        _ => err
            .io_error()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound),
    }
}

/// Makes `dest` an exact copy of `source`
///
/// Destination entries with no counterpart in the source (or whose kind
/// changed) are removed, directories are created, and every file is copied.
/// Running it twice yields the same tree.
pub fn mirror_dir(source: &Path, dest: &Path) -> Result<MirrorStats> {
    if !source.is_dir() {
        anyhow::bail!("source directory {} does not exist", source.display());
    }

    let mut stats = MirrorStats::default();

    if dest.exists() && !dest.is_dir() {
        fs::remove_file(dest).with_context(|| format!("Failed to remove {}", dest.display()))?;
        stats.entries_removed += 1;
    }
    fs::create_dir_all(dest).with_context(|| format!("Failed to create {}", dest.display()))?;

    let source_entries = list_tree(source)?;
    let source_kinds: HashMap<&Path, EntryKind> = source_entries
        .iter()
        .map(|(path, kind)| (path.as_path(), *kind))
        .collect();

    // Prune what the source no longer has
    let mut removed_dirs: Vec<PathBuf> = Vec::new();
    for (relative, kind) in list_tree(dest)? {
        if removed_dirs.iter().any(|dir| relative.starts_with(dir)) {
            continue;
        }
        if source_kinds.get(relative.as_path()) == Some(&kind) {
            continue;
        }
        let target = dest.join(&relative);
        match kind {
            EntryKind::Dir => {
                fs::remove_dir_all(&target)
                    .with_context(|| format!("Failed to remove {}", target.display()))?;
                removed_dirs.push(relative);
            }
            EntryKind::File => {
                fs::remove_file(&target)
                    .with_context(|| format!("Failed to remove {}", target.display()))?;
            }
        }
        stats.entries_removed += 1;
    }

    for (relative, kind) in &source_entries {
        if *kind == EntryKind::Dir {
            let target = dest.join(relative);
            if !target.is_dir() {
                fs::create_dir_all(&target)
                    .with_context(|| format!("Failed to create {}", target.display()))?;
                stats.dirs_created += 1;
            }
        }
    }

    let files: Vec<&PathBuf> = source_entries
        .iter()
        .filter(|(_, kind)| *kind == EntryKind::File)
        .map(|(path, _)| path)
        .collect();
    files.par_iter().try_for_each(|relative| -> Result<()> {
        let from = source.join(relative);
        let to = dest.join(relative);
        fs::copy(&from, &to)
            .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
        Ok(())
    })?;
    stats.files_copied = files.len();

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn snapshot(root: &Path) -> Vec<(PathBuf, Option<String>)> {
        list_tree(root)
            .unwrap()
            .into_iter()
            .map(|(relative, kind)| {
                let content = match kind {
                    EntryKind::File => Some(fs::read_to_string(root.join(&relative)).unwrap()),
                    EntryKind::Dir => None,
                };
                (relative, content)
            })
            .collect()
    }

    #[test]
    fn test_mirror_copies_nested_tree_including_hidden_files() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src");
        let dest = temp_dir.path().join("dest");
        write(&source, "a.py", "a");
        write(&source, "sub/b.py", "b");
        write(&source, ".hidden/c.txt", "c");
        write(&source, ".gitignore", "*.py");

        let stats = mirror_dir(&source, &dest).unwrap();
        assert_eq!(stats.files_copied, 4);
        assert_eq!(snapshot(&source), snapshot(&dest));
    }

    #[test]
    fn test_mirror_is_idempotent_and_prunes_removed_entries() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src");
        let dest = temp_dir.path().join("dest");
        write(&source, "keep.py", "1");
        write(&source, "gone.py", "2");
        write(&source, "olddir/x.py", "3");

        mirror_dir(&source, &dest).unwrap();
        let first = snapshot(&dest);
        mirror_dir(&source, &dest).unwrap();
        assert_eq!(first, snapshot(&dest));

        fs::remove_file(source.join("gone.py")).unwrap();
        fs::remove_dir_all(source.join("olddir")).unwrap();
        write(&source, "keep.py", "updated");

        let stats = mirror_dir(&source, &dest).unwrap();
        assert!(!dest.join("gone.py").exists());
        assert!(!dest.join("olddir").exists());
        assert_eq!(fs::read_to_string(dest.join("keep.py")).unwrap(), "updated");
        assert_eq!(stats.entries_removed, 2);
        assert_eq!(snapshot(&source), snapshot(&dest));
    }

    #[test]
    fn test_kind_change_replaces_entry() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src");
        let dest = temp_dir.path().join("dest");
        write(&source, "thing/inner.py", "dir now");
        write(&dest, "thing", "was a file");

        mirror_dir(&source, &dest).unwrap();
        assert!(dest.join("thing").is_dir());
        assert_eq!(fs::read_to_string(dest.join("thing/inner.py")).unwrap(), "dir now");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_copied_through() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src");
        let dest = temp_dir.path().join("dest");
        write(&source, "module.py", "m");
        write(temp_dir.path(), "shared/helpers.py", "h");
        write(temp_dir.path(), "shared/nested/deep.py", "d");
        std::os::unix::fs::symlink(temp_dir.path().join("shared"), source.join("shared")).unwrap();

        let stats = mirror_dir(&source, &dest).unwrap();

        assert_eq!(stats.files_copied, 3);
        let linked = fs::symlink_metadata(dest.join("shared")).unwrap();
        assert!(linked.file_type().is_dir());
        assert_eq!(fs::read_to_string(dest.join("shared/helpers.py")).unwrap(), "h");
        assert_eq!(fs::read_to_string(dest.join("shared/nested/deep.py")).unwrap(), "d");

        // A second pass sees the same tree and prunes nothing
        let again = mirror_dir(&source, &dest).unwrap();
        assert_eq!(again.entries_removed, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_link_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src");
        let dest = temp_dir.path().join("dest");
        write(&source, "module.py", "m");
        std::os::unix::fs::symlink(temp_dir.path().join("nowhere"), source.join("broken")).unwrap();

        let stats = mirror_dir(&source, &dest).unwrap();

        assert_eq!(stats.files_copied, 1);
        assert!(dest.join("module.py").is_file());
        assert!(fs::symlink_metadata(dest.join("broken")).is_err());
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = mirror_dir(&temp_dir.path().join("nope"), &temp_dir.path().join("dest"));
        assert!(result.is_err());
        assert!(!temp_dir.path().join("dest").exists());
    }
}
