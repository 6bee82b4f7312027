//! Directory enumeration with jwalk.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use jwalk::{Parallelism, WalkDir};

use gitpulse_core::{ScanConfig, ScanWarning, WarningKind};

/// A directory listed during the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedDir {
    pub path: PathBuf,
    /// The metadata directory was observed as a direct child.
    pub is_repository_root: bool,
}

/// All directories listed under a root, in depth-first order.
#[derive(Debug, Default)]
pub struct DirectoryWalk {
    pub dirs: Vec<VisitedDir>,
    pub warnings: Vec<ScanWarning>,
}

/// Enumerate directories below `root` the way discovery visits them.
///
/// Directories at depth `<= config.max_depth` are listed (the root is depth 0).
/// Skipped directory names are pruned with their subtrees, and the metadata
/// directory is recorded against its parent but never read.
pub fn enumerate_directories(config: &ScanConfig, root: &Path) -> DirectoryWalk {
    let filter = config.clone();
    let max_depth = config.max_depth as usize;

    let walker = WalkDir::new(root)
        .parallelism(Parallelism::Serial)
        .skip_hidden(false)
        .follow_links(config.follow_symlinks)
        .sort(true)
        .min_depth(0)
        // One level deeper than listed, so metadata directories of the
        // deepest listed directories are still observed.
        .max_depth(max_depth + 1)
        .process_read_dir(move |_depth, _path, _state, children| {
            // The metadata directory is kept even when listed in the skip set.
            children.retain(|entry| match entry {
                Ok(entry) => {
                    let name = entry.file_name.to_string_lossy();
                    entry.file_type().is_dir()
                        && (filter.is_metadata_dir(&name) || !filter.should_skip(&name))
                }
                Err(_) => true,
            });
            for entry in children.iter_mut().flatten() {
                if filter.is_metadata_dir(&entry.file_name.to_string_lossy()) {
                    entry.read_children_path = None;
                }
            }
        });

    // Keyed by path so a root is flagged once however often it is seen.
    let mut dirs: IndexMap<PathBuf, bool> = IndexMap::new();
    let mut warnings = Vec::new();

    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                let warning = match err.io_error() {
                    Some(io_err) => ScanWarning::from_io(path, io_err),
                    None => ScanWarning::new(path, err.to_string(), WarningKind::ReadError),
                };
                tracing::warn!(path = %warning.path.display(), "{}", warning.message);
                warnings.push(warning);
                continue;
            }
        };

        if entry.depth > 0 && config.is_metadata_dir(&entry.file_name.to_string_lossy()) {
            if let Some(is_root) = dirs.get_mut(entry.parent_path()) {
                *is_root = true;
            }
            continue;
        }

        if entry.depth <= max_depth {
            dirs.entry(entry.path()).or_insert(false);
        }
    }

    DirectoryWalk {
        dirs: dirs
            .into_iter()
            .map(|(path, is_repository_root)| VisitedDir {
                path,
                is_repository_root,
            })
            .collect(),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn repository_roots(walk: &DirectoryWalk) -> Vec<&Path> {
        walk.dirs
            .iter()
            .filter(|d| d.is_repository_root)
            .map(|d| d.path.as_path())
            .collect()
    }

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("alpha/.git/objects")).unwrap();
        fs::create_dir_all(root.join("alpha/src")).unwrap();
        fs::create_dir_all(root.join("group/beta/.git")).unwrap();
        fs::create_dir_all(root.join("node_modules/dep/.git")).unwrap();
        fs::create_dir_all(root.join("a/b/c/deep/.git")).unwrap();
        fs::create_dir_all(root.join("a/b/shallow/.git")).unwrap();
        fs::write(root.join("README.md"), "hello").unwrap();

        temp
    }

    #[test]
    fn test_finds_roots_in_depth_first_order() {
        let temp = create_test_tree();
        let walk = enumerate_directories(&ScanConfig::new(temp.path()), temp.path());

        let roots: Vec<PathBuf> = repository_roots(&walk)
            .into_iter()
            .map(|p| p.strip_prefix(temp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            roots,
            vec![
                PathBuf::from("a/b/shallow"),
                PathBuf::from("alpha"),
                PathBuf::from("group/beta"),
            ]
        );
    }

    #[test]
    fn test_never_lists_metadata_or_skipped_dirs() {
        let temp = create_test_tree();
        let walk = enumerate_directories(&ScanConfig::new(temp.path()), temp.path());

        for dir in &walk.dirs {
            assert!(
                !dir.path.components().any(|c| c.as_os_str() == ".git"),
                "descended into {}",
                dir.path.display()
            );
            assert!(!dir.path.components().any(|c| c.as_os_str() == "node_modules"));
        }
    }

    #[test]
    fn test_depth_limit() {
        let temp = create_test_tree();
        let config = ScanConfig::builder()
            .root(temp.path())
            .max_depth(4u32)
            .build()
            .unwrap();
        let walk = enumerate_directories(&config, temp.path());

        assert!(repository_roots(&walk)
            .iter()
            .any(|p| p.ends_with("a/b/c/deep")));
    }

    #[test]
    fn test_root_itself_can_be_a_repository() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();

        let walk = enumerate_directories(&ScanConfig::new(temp.path()), temp.path());
        assert_eq!(walk.dirs[0].path, temp.path());
        assert!(walk.dirs[0].is_repository_root);
    }

    #[test]
    fn test_metadata_file_is_not_a_root_marker() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("sub/.git"), "gitdir: ../.git/modules/sub").unwrap();

        let walk = enumerate_directories(&ScanConfig::new(temp.path()), temp.path());
        assert!(repository_roots(&walk).is_empty());
    }

    #[test]
    fn test_metadata_dir_in_skip_list_still_marks_roots() {
        let temp = create_test_tree();
        let config = ScanConfig::builder()
            .root(temp.path())
            .skip_dirs(vec![".git".to_string(), "node_modules".to_string()])
            .build()
            .unwrap();
        let walk = enumerate_directories(&config, temp.path());

        let roots = repository_roots(&walk);
        assert_eq!(roots.len(), 3);
        assert!(roots.iter().any(|p| p.ends_with("alpha")));
        assert!(!walk
            .dirs
            .iter()
            .any(|d| d.path.components().any(|c| c.as_os_str() == ".git")));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_a_warning() {
        use std::os::unix::fs::PermissionsExt;

        let temp = create_test_tree();
        let locked = temp.path().join("locked");
        fs::create_dir_all(locked.join("hidden/.git")).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can list the directory anyway
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let walk = enumerate_directories(&ScanConfig::new(temp.path()), temp.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(walk.warnings.len(), 1);
        assert_eq!(walk.warnings[0].path, locked);
        assert_eq!(walk.warnings[0].kind, WarningKind::PermissionDenied);

        let roots = repository_roots(&walk);
        assert_eq!(roots.len(), 3);
        assert!(roots.iter().any(|p| p.ends_with("group/beta")));
        assert!(!roots.iter().any(|p| p.starts_with(&locked)));
    }
}
