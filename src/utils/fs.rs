//! Path display helpers

use std::path::{Component, Path};

/// Shortens a path for one-line display, keeping its last two components
///
/// Paths already within `max_length` characters, or with fewer than three
/// components, are returned unchanged.
pub fn shorten_path(path: &Path, max_length: usize) -> String {
    let full = path.to_string_lossy();
    if full.chars().count() <= max_length {
        return full.into_owned();
    }

    let names: Vec<String> = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if names.len() < 3 {
        return full.into_owned();
    }

    format!(".../{}/{}", names[names.len() - 2], names[names.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_short_paths_are_untouched() {
        assert_eq!(shorten_path(Path::new("remote_repositories/Foo"), 30), "remote_repositories/Foo");
    }

    #[test]
    fn test_long_paths_keep_last_two_components() {
        let path = PathBuf::from("/home/someone/workspace/remote_repositories/SomeRepository");
        assert_eq!(shorten_path(&path, 30), ".../remote_repositories/SomeRepository");
    }

    #[test]
    fn test_two_component_paths_cannot_shorten() {
        let path = PathBuf::from("a_really_long_directory_name/another_long_name");
        assert_eq!(shorten_path(&path, 10), "a_really_long_directory_name/another_long_name");
    }
}
