//! Collecting candidate files under the given roots.

use std::{
    collections::HashSet,
    fs,
    path::{Component, Path, PathBuf},
};

use walkdir::WalkDir;

use crate::error::{LintError, LintResult};

/// Lexically normalizes a path: drops `.` components and folds `..` into the
/// preceding component. The filesystem is not consulted.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last_is_normal =
                    matches!(out.components().next_back(), Some(Component::Normal(_)));
                if last_is_normal {
                    out.pop();
                } else if !out.has_root() {
                    // `/..` is `/`
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

/// Every file reachable from `roots`, normalized, each listed once.
///
/// Regular files are listed directly, directories are walked recursively.
/// Overlapping roots do not produce duplicates; the first occurrence keeps its
/// position.
/// Symlinks are not followed: a link to a file is listed as-is, a link to a
/// directory is skipped.
///
/// # Errors
///
/// Returns [`LintError::Io`] for a root that does not exist and
/// [`LintError::Walk`] when a directory cannot be read.
pub fn enumerate<P: AsRef<Path>>(roots: &[P]) -> LintResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |path: PathBuf| {
        if seen.insert(path.clone()) {
            files.push(path);
        }
    };
    for root in roots {
        let root = root.as_ref();
        let metadata = fs::metadata(root).map_err(|source| LintError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        if !metadata.is_dir() {
            push(normalize(root));
            continue;
        }

        for entry in WalkDir::new(root) {
            let entry = entry?;
            let file_type = entry.file_type();
            if file_type.is_dir() || (file_type.is_symlink() && entry.path().is_dir()) {
                continue;
            }
            push(normalize(entry.path()));
        }
    }
    tracing::debug!(roots = roots.len(), files = files.len(), "enumerated files");
    Ok(files)
}

/// Like [`enumerate`], but roots that do not exist are skipped with a warning.
pub fn enumerate_existing<P: AsRef<Path>>(roots: &[P]) -> LintResult<Vec<PathBuf>> {
    let existing: Vec<&Path> = roots
        .iter()
        .map(AsRef::as_ref)
        .filter(|root| {
            let exists = root.exists();
            if !exists {
                tracing::warn!(path = %root.display(), "ignoring missing path");
            }
            exists
        })
        .collect();
    enumerate(&existing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("./a/b/../c.h")), PathBuf::from("a/c.h"));
        assert_eq!(normalize(Path::new("a/./b//c.py")), PathBuf::from("a/b/c.py"));
        assert_eq!(normalize(Path::new("../x/../y")), PathBuf::from("../y"));
        assert_eq!(normalize(Path::new("a/..")), PathBuf::from("."));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_walks_nested_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        fs::write(dir.path().join("top.py"), "").unwrap();
        fs::write(dir.path().join("src/a.cc"), "").unwrap();
        fs::write(dir.path().join("src/nested/b.h"), "").unwrap();

        let files: BTreeSet<PathBuf> = enumerate(&[dir.path()]).unwrap().into_iter().collect();
        let expected: BTreeSet<PathBuf> = ["top.py", "src/a.cc", "src/nested/b.h"]
            .iter()
            .map(|rel| dir.path().join(rel))
            .collect();
        assert_eq!(files, expected);
    }

    #[test]
    fn test_file_root_listed_directly() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("only.cpp");
        fs::write(&file, "").unwrap();

        assert_eq!(enumerate(&[&file]).unwrap(), vec![file]);
    }

    #[test]
    fn test_overlapping_roots_listed_once() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        let file = dir.path().join("src/a.cc");
        fs::write(&file, "").unwrap();
        let other = dir.path().join("b.py");
        fs::write(&other, "").unwrap();

        let roots = [
            dir.path().to_path_buf(),
            file.clone(),
            dir.path().join("src/../src"),
            dir.path().to_path_buf(),
        ];
        let mut files = enumerate(&roots).unwrap();
        files.sort();
        let mut expected = vec![file, other];
        expected.sort();
        assert_eq!(files, expected);
    }

    #[test]
    fn test_missing_root_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let err = enumerate(&[&missing]).unwrap_err();
        assert!(matches!(err, LintError::Io { path, .. } if path == missing));
    }

    #[test]
    fn test_enumerate_existing_skips_missing() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("x.py");
        fs::write(&file, "").unwrap();

        let files = enumerate_existing(&[dir.path().join("missing"), file.clone()]).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_terminates() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/a.py"), "").unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("sub/loop")).unwrap();

        let files = enumerate(&[dir.path()]).unwrap();
        assert_eq!(files, vec![dir.path().join("sub/a.py")]);
    }
}
