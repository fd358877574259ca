//! Path resolution confined to a sandbox root.
//!
//! User-supplied paths are joined onto the current directory, canonicalized
//! to resolve symlinks and relative segments, and then checked against the
//! sandbox root component by component. A raw string prefix check would
//! admit siblings such as `/ws-evil` for a root of `/ws`; [`Path::starts_with`]
//! does not.

use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Errors produced while resolving a path inside the sandbox
#[derive(Debug, Error)]
pub enum PathError {
    /// The resolved path is not the root or one of its descendants
    #[error("access denied: {} is outside the sandbox", .path.display())]
    OutsideSandbox {
        /// The path as it resolved on disk
        path: PathBuf,
    },
    /// The path could not be resolved
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

/// Resolve `raw` against `current_dir`, confined to `root`.
///
/// An empty `raw` resolves to `current_dir`. Any other input, including
/// leading or trailing whitespace, is taken as a literal path. Absolute inputs replace the base
/// as with [`Path::join`] and are subject to the same confinement check.
/// Segments that do not exist yet are appended lexically to the deepest
/// existing ancestor, so paths for files and directories about to be
/// created still resolve.
pub fn resolve(raw: &str, current_dir: &Path, root: &Path) -> Result<PathBuf, PathError> {
    let root = std::fs::canonicalize(root).map_err(|e| {
        PathError::InvalidPath(format!("sandbox root {}: {}", root.display(), e))
    })?;

    let joined = if raw.is_empty() {
        current_dir.to_path_buf()
    } else {
        current_dir.join(raw)
    };

    let resolved = canonicalize_partial(&joined)
        .map_err(|e| PathError::InvalidPath(format!("{}: {}", raw, e)))?;

    if is_within(&resolved, &root) {
        Ok(resolved)
    } else {
        Err(PathError::OutsideSandbox { path: resolved })
    }
}

/// Whether `path` is `root` or a descendant of it, compared by component.
pub fn is_within(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

/// Canonicalize `path`, tolerating a missing tail.
///
/// The longest existing ancestor is canonicalized and the remaining segments
/// are normalized lexically on top of it. Errors other than not-found are
/// returned as-is.
fn canonicalize_partial(path: &Path) -> io::Result<PathBuf> {
    match std::fs::canonicalize(path) {
        Ok(p) => return Ok(p),
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
        Err(_) => {}
    }

    let mut missing = Vec::new();
    let mut probe = path;
    loop {
        let Some(parent) = probe.parent() else {
            return Ok(normalize_lexically(path));
        };
        if let Some(name) = probe.file_name() {
            missing.push(name.to_os_string());
        } else {
            // `..` or `.` tail: keep the component itself for lexical handling
            missing.push(probe.components().next_back().map_or_else(
                || std::ffi::OsString::from("."),
                |c| c.as_os_str().to_os_string(),
            ));
        }
        probe = parent;

        match std::fs::canonicalize(probe) {
            Ok(base) => {
                let mut full = base;
                for segment in missing.into_iter().rev() {
                    full.push(segment);
                }
                return Ok(normalize_lexically(&full));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Normalize `.` and `..` segments without touching the filesystem.
///
/// `..` at the filesystem root stays at the root.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(p) => out.push(p.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(c) => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("ws");
        fs::create_dir(&root).unwrap();
        let root = fs::canonicalize(&root).unwrap();
        (temp, root)
    }

    #[test]
    fn test_empty_resolves_to_current() {
        let (_temp, root) = setup();
        fs::create_dir(root.join("sub")).unwrap();
        let current = root.join("sub");

        assert_eq!(resolve("", &current, &root).unwrap(), current);
    }

    #[test]
    fn test_surrounding_whitespace_is_kept() {
        let (_temp, root) = setup();
        assert_eq!(resolve(" a.txt", &root, &root).unwrap(), root.join(" a.txt"));
        assert_eq!(resolve("dir ", &root, &root).unwrap(), root.join("dir "));
        assert_eq!(resolve("  ", &root, &root).unwrap(), root.join("  "));
    }

    #[test]
    fn test_relative_inside() {
        let (_temp, root) = setup();
        fs::create_dir(root.join("src")).unwrap();
        fs::write(root.join("src/main.rs"), "fn main() {}").unwrap();

        let resolved = resolve("src/main.rs", &root, &root).unwrap();
        assert_eq!(resolved, root.join("src/main.rs"));
    }

    #[test]
    fn test_dotdot_within_root() {
        let (_temp, root) = setup();
        fs::create_dir_all(root.join("a/b")).unwrap();

        let resolved = resolve("../..", &root.join("a/b"), &root).unwrap();
        assert_eq!(resolved, root);
    }

    #[test]
    fn test_dotdot_above_root_rejected() {
        let (_temp, root) = setup();
        let err = resolve("..", &root, &root).unwrap_err();
        assert!(matches!(err, PathError::OutsideSandbox { .. }));
    }

    #[test]
    fn test_sibling_with_shared_prefix_rejected() {
        let (temp, root) = setup();
        let evil = temp.path().join("ws-evil");
        fs::create_dir(&evil).unwrap();
        fs::write(evil.join("secret.txt"), "secret").unwrap();

        let err = resolve("../ws-evil/secret.txt", &root, &root).unwrap_err();
        assert!(matches!(err, PathError::OutsideSandbox { .. }), "{err:?}");
    }

    #[test]
    fn test_absolute_outside_rejected() {
        let (temp, root) = setup();
        let outside = temp.path().join("elsewhere");
        fs::create_dir(&outside).unwrap();

        let err = resolve(outside.to_str().unwrap(), &root, &root).unwrap_err();
        assert!(matches!(err, PathError::OutsideSandbox { .. }));
    }

    #[test]
    fn test_absolute_inside_accepted() {
        let (_temp, root) = setup();
        fs::create_dir(root.join("docs")).unwrap();
        let target = root.join("docs");

        assert_eq!(resolve(target.to_str().unwrap(), &root, &root).unwrap(), target);
    }

    #[test]
    fn test_tilde_is_literal_segment() {
        let (_temp, root) = setup();
        assert_eq!(resolve("~", &root, &root).unwrap(), root.join("~"));
    }

    #[test]
    fn test_missing_nested_segments_resolve() {
        let (_temp, root) = setup();
        let resolved = resolve("x/y/../z", &root, &root).unwrap();
        assert_eq!(resolved, root.join("x/z"));
    }

    #[test]
    fn test_missing_segments_cannot_escape() {
        let (_temp, root) = setup();
        let err = resolve("nope/../../outside", &root, &root).unwrap_err();
        assert!(matches!(err, PathError::OutsideSandbox { .. }));
    }

    #[test]
    fn test_file_as_directory_is_invalid() {
        let (_temp, root) = setup();
        fs::write(root.join("plain.txt"), "x").unwrap();

        let err = resolve("plain.txt/child", &root, &root).unwrap_err();
        assert!(matches!(err, PathError::InvalidPath(_)), "{err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let (temp, root) = setup();
        let outside = temp.path().join("outside");
        fs::create_dir(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("link")).unwrap();

        let err = resolve("link", &root, &root).unwrap_err();
        assert!(matches!(err, PathError::OutsideSandbox { .. }));

        let err = resolve("link/new.txt", &root, &root).unwrap_err();
        assert!(matches!(err, PathError::OutsideSandbox { .. }));
    }

    #[test]
    fn test_is_within_compares_components() {
        assert!(is_within(Path::new("/ws"), Path::new("/ws")));
        assert!(is_within(Path::new("/ws/a/b"), Path::new("/ws")));
        assert!(!is_within(Path::new("/ws-evil"), Path::new("/ws")));
        assert!(!is_within(Path::new("/"), Path::new("/ws")));
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(
            normalize_lexically(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
        assert_eq!(normalize_lexically(Path::new("/a/../..")), PathBuf::from("/"));
    }
}
