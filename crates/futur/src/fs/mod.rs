//! Filesystem operations inside the sandbox.
//!
//! This module provides:
//! - [`list`] - ordered directory listing ([`Listing`])
//! - [`change_directory`], [`make_directory`], [`create_file`], [`read_file`]
//! - [`tree`] - lazy pre-order traversal ([`TreeWalker`])
//!
//! Every path argument goes through [`Sandbox::sanitize`] before the
//! filesystem is touched.

mod listing;
mod tree;

pub use listing::*;
pub use tree::*;

use std::fs::OpenOptions;
use std::io;

use thiserror::Error;

use crate::path::PathError;
use crate::sandbox::Sandbox;

/// Errors that can occur during filesystem operations
#[derive(Debug, Error)]
pub enum FsError {
    /// Path resolution or confinement failure
    #[error(transparent)]
    Path(#[from] PathError),
    /// Path is not a directory
    #[error("not a directory: {0}")]
    NotADirectory(String),
    /// Path is not a file
    #[error("not a file: {0}")]
    NotAFile(String),
    /// Target of a create operation already exists
    #[error("path already exists: {0}")]
    AlreadyExists(String),
    /// A required name argument was omitted
    #[error("{0} name required")]
    MissingArgument(&'static str),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// List a directory, defaulting to the current one.
pub fn list(sandbox: &Sandbox, path: Option<&str>) -> Result<Listing, FsError> {
    let raw = path.unwrap_or_default();
    let target = sandbox.sanitize(raw)?;
    if !target.is_dir() {
        return Err(FsError::NotADirectory(display_arg(raw, &target)));
    }
    Listing::read(&target, target != sandbox.root())
}

/// Change the current directory, defaulting to the root.
pub fn change_directory(sandbox: &mut Sandbox, path: Option<&str>) -> Result<(), FsError> {
    let raw = match path {
        Some(p) if !p.is_empty() => p,
        _ => {
            let root = sandbox.root().to_path_buf();
            return Ok(sandbox.set_current_path(root)?);
        }
    };

    let target = sandbox.sanitize(raw)?;
    if !target.is_dir() {
        return Err(FsError::NotADirectory(raw.to_string()));
    }
    sandbox.set_current_path(target)?;
    Ok(())
}

/// Create a directory and any missing parents. Returns the new directory's name.
pub fn make_directory(sandbox: &Sandbox, path: Option<&str>) -> Result<String, FsError> {
    let raw = required(path, "directory")?;
    let target = sandbox.sanitize(raw)?;
    if target.exists() {
        return Err(FsError::AlreadyExists(raw.to_string()));
    }
    std::fs::create_dir_all(&target)?;
    Ok(entry_name(&target))
}

/// Create an empty file. Returns the new file's name.
pub fn create_file(sandbox: &Sandbox, path: Option<&str>) -> Result<String, FsError> {
    let raw = required(path, "file")?;
    let target = sandbox.sanitize(raw)?;
    if target.exists() {
        return Err(FsError::AlreadyExists(raw.to_string()));
    }
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists(raw.to_string()),
            _ => FsError::Io(e),
        })?;
    Ok(entry_name(&target))
}

/// Contents of a regular file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContents {
    /// File name, used as a title
    pub name: String,
    /// Text contents, invalid UTF-8 replaced
    pub text: String,
}

/// Read a file as text.
pub fn read_file(sandbox: &Sandbox, path: Option<&str>) -> Result<FileContents, FsError> {
    let raw = required(path, "file")?;
    let target = sandbox.sanitize(raw)?;
    if !target.is_file() {
        return Err(FsError::NotAFile(raw.to_string()));
    }
    let bytes = std::fs::read(&target)?;
    Ok(FileContents {
        name: entry_name(&target),
        text: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

/// Start a lazy tree traversal, defaulting to the current directory.
pub fn tree(sandbox: &Sandbox, path: Option<&str>) -> Result<TreeWalker, FsError> {
    let raw = path.unwrap_or_default();
    let target = sandbox.sanitize(raw)?;
    if !target.is_dir() {
        return Err(FsError::NotADirectory(display_arg(raw, &target)));
    }
    Ok(TreeWalker::new(target))
}

fn required<'a>(path: Option<&'a str>, what: &'static str) -> Result<&'a str, FsError> {
    match path {
        Some(p) if !p.is_empty() => Ok(p),
        _ => Err(FsError::MissingArgument(what)),
    }
}

fn entry_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn display_arg(raw: &str, resolved: &std::path::Path) -> String {
    if raw.is_empty() {
        resolved.display().to_string()
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sandbox() -> (TempDir, Sandbox) {
        let temp = TempDir::new().unwrap();
        let sandbox = Sandbox::initialize(temp.path().join("ws")).unwrap();
        (temp, sandbox)
    }

    #[test]
    fn test_make_directory_creates_parents() {
        let (_temp, sandbox) = sandbox();
        let name = make_directory(&sandbox, Some("a/b/c")).unwrap();
        assert_eq!(name, "c");
        assert!(sandbox.root().join("a/b/c").is_dir());
    }

    #[test]
    fn test_make_directory_collision() {
        let (_temp, sandbox) = sandbox();
        make_directory(&sandbox, Some("dup")).unwrap();
        assert!(matches!(
            make_directory(&sandbox, Some("dup")),
            Err(FsError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_missing_argument_before_filesystem_access() {
        let (_temp, sandbox) = sandbox();
        assert!(matches!(
            make_directory(&sandbox, None),
            Err(FsError::MissingArgument("directory"))
        ));
        assert!(matches!(
            create_file(&sandbox, Some("")),
            Err(FsError::MissingArgument("file"))
        ));
        assert!(matches!(
            read_file(&sandbox, None),
            Err(FsError::MissingArgument("file"))
        ));
    }

    #[test]
    fn test_create_file_collision_keeps_content() {
        let (_temp, sandbox) = sandbox();
        create_file(&sandbox, Some("a.txt")).unwrap();
        std::fs::write(sandbox.root().join("a.txt"), "original").unwrap();

        let err = create_file(&sandbox, Some("a.txt")).unwrap_err();
        assert!(matches!(err, FsError::AlreadyExists(_)));
        assert_eq!(
            std::fs::read_to_string(sandbox.root().join("a.txt")).unwrap(),
            "original"
        );
    }

    #[test]
    fn test_read_file() {
        let (_temp, sandbox) = sandbox();
        std::fs::write(sandbox.root().join("notes.md"), "# hello\n").unwrap();

        let contents = read_file(&sandbox, Some("notes.md")).unwrap();
        assert_eq!(contents.name, "notes.md");
        assert_eq!(contents.text, "# hello\n");
    }

    #[test]
    fn test_read_file_on_directory() {
        let (_temp, sandbox) = sandbox();
        make_directory(&sandbox, Some("dir")).unwrap();
        assert!(matches!(
            read_file(&sandbox, Some("dir")),
            Err(FsError::NotAFile(_))
        ));
        assert!(matches!(
            read_file(&sandbox, Some("missing.txt")),
            Err(FsError::NotAFile(_))
        ));
    }

    #[test]
    fn test_change_directory_and_back_to_root() {
        let (_temp, mut sandbox) = sandbox();
        make_directory(&sandbox, Some("src/nested")).unwrap();

        change_directory(&mut sandbox, Some("src/nested")).unwrap();
        assert!(sandbox.current_path().ends_with("src/nested"));

        change_directory(&mut sandbox, Some("..")).unwrap();
        assert!(sandbox.current_path().ends_with("src"));

        change_directory(&mut sandbox, None).unwrap();
        assert_eq!(sandbox.current_path(), sandbox.root());
    }

    #[test]
    fn test_change_directory_above_root_rejected() {
        let (_temp, mut sandbox) = sandbox();
        let err = change_directory(&mut sandbox, Some("..")).unwrap_err();
        assert!(matches!(
            err,
            FsError::Path(PathError::OutsideSandbox { .. })
        ));
        assert_eq!(sandbox.current_path(), sandbox.root());
    }

    #[test]
    fn test_change_directory_into_file() {
        let (_temp, mut sandbox) = sandbox();
        create_file(&sandbox, Some("f.txt")).unwrap();
        assert!(matches!(
            change_directory(&mut sandbox, Some("f.txt")),
            Err(FsError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_list_not_a_directory() {
        let (_temp, sandbox) = sandbox();
        create_file(&sandbox, Some("f.txt")).unwrap();
        assert!(matches!(
            list(&sandbox, Some("f.txt")),
            Err(FsError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_tree_not_a_directory() {
        let (_temp, sandbox) = sandbox();
        create_file(&sandbox, Some("f.txt")).unwrap();
        assert!(matches!(
            tree(&sandbox, Some("f.txt")),
            Err(FsError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_create_outside_rejected() {
        let (temp, sandbox) = sandbox();
        let err = create_file(&sandbox, Some("../escape.txt")).unwrap_err();
        assert!(matches!(
            err,
            FsError::Path(PathError::OutsideSandbox { .. })
        ));
        assert!(!temp.path().join("escape.txt").exists());
    }
}
