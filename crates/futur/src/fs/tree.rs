//! Lazy directory tree traversal.
//!
//! [`TreeWalker`] yields entries depth-first in pre-order using an explicit
//! stack, so directory depth never grows the call stack. Entries whose name
//! starts with `.` are skipped at every level, together with everything
//! below them.

use std::path::{Path, PathBuf};

use super::FsError;

/// One node of a tree traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Full path of the entry
    pub path: PathBuf,
    /// Entry name
    pub name: String,
    /// Depth below the traversal root (the root itself is 0)
    pub depth: usize,
    /// Whether this is the last visible sibling at its depth
    pub is_last: bool,
}

#[derive(Debug)]
struct Frame {
    children: std::vec::IntoIter<PathBuf>,
    depth: usize,
}

/// Pre-order, depth-first iterator over a directory tree.
///
/// Each directory is read when it is reached. Symlinked directories are
/// listed but not entered. A directory that cannot be read yields one
/// `Err` right after its own entry, and the walk goes on with its siblings.
#[derive(Debug)]
pub struct TreeWalker {
    root: Option<PathBuf>,
    stack: Vec<Frame>,
    pending_error: Option<FsError>,
}

impl TreeWalker {
    /// Create a walker rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            stack: Vec::new(),
            pending_error: None,
        }
    }

    fn enter(&mut self, dir: &Path, depth: usize) {
        match visible_children(dir) {
            Ok(children) if !children.is_empty() => self.stack.push(Frame {
                children: children.into_iter(),
                depth: depth + 1,
            }),
            Ok(_) => {}
            Err(e) => self.pending_error = Some(e),
        }
    }

    fn visit(&mut self, path: PathBuf, depth: usize, is_last: bool) -> TreeEntry {
        let descend = std::fs::symlink_metadata(&path)
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if descend {
            self.enter(&path, depth);
        }
        TreeEntry {
            name: name_of(&path),
            path,
            depth,
            is_last,
        }
    }
}

impl Iterator for TreeWalker {
    type Item = Result<TreeEntry, FsError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending_error.take() {
            return Some(Err(err));
        }

        if let Some(root) = self.root.take() {
            if is_hidden(&root) {
                return None;
            }
            return Some(Ok(self.visit(root, 0, true)));
        }

        loop {
            let frame = self.stack.last_mut()?;
            let depth = frame.depth;
            match frame.children.next() {
                Some(child) => {
                    let is_last = frame.children.as_slice().is_empty();
                    return Some(Ok(self.visit(child, depth, is_last)));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

fn visible_children(dir: &Path) -> Result<Vec<PathBuf>, FsError> {
    let mut children = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_name().to_string_lossy().starts_with('.') {
            children.push(entry.path());
        }
    }
    children.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(children)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('.'))
}

fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Turns [`TreeEntry`] values into box-drawing lines.
///
/// Keeps one "last sibling" flag per open depth, which is all the state the
/// connectors need.
#[derive(Debug, Default)]
pub struct TreeRenderer {
    last_at_depth: Vec<bool>,
}

impl TreeRenderer {
    /// Create a renderer
    pub fn new() -> Self {
        Self::default()
    }

    /// Render one entry. Entries must arrive in traversal order.
    pub fn line(&mut self, entry: &TreeEntry) -> String {
        self.last_at_depth.truncate(entry.depth);

        let mut line = String::new();
        for &last in &self.last_at_depth {
            line.push_str(if last { "    " } else { "│   " });
        }
        line.push_str(if entry.is_last { "└── " } else { "├── " });
        line.push_str(&entry.name);

        self.last_at_depth.push(entry.is_last);
        line
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("proj");
        std::fs::create_dir_all(root.join(".git/objects")).unwrap();
        std::fs::create_dir_all(root.join("src/bin")).unwrap();
        std::fs::write(root.join("src/lib.rs"), "").unwrap();
        std::fs::write(root.join("src/bin/main.rs"), "").unwrap();
        std::fs::write(root.join("Cargo.toml"), "").unwrap();
        std::fs::write(root.join(".env"), "").unwrap();
        temp
    }

    #[test]
    fn test_preorder_alphabetical_without_hidden() {
        let temp = fixture();
        let entries: Vec<_> = TreeWalker::new(temp.path().join("proj"))
            .map(|e| e.unwrap())
            .map(|e| (e.name, e.depth, e.is_last))
            .collect();

        assert_eq!(
            entries,
            vec![
                ("proj".to_string(), 0, true),
                ("Cargo.toml".to_string(), 1, false),
                ("src".to_string(), 1, true),
                ("bin".to_string(), 2, false),
                ("main.rs".to_string(), 3, true),
                ("lib.rs".to_string(), 2, true),
            ]
        );
    }

    #[test]
    fn test_hidden_root_yields_nothing() {
        let temp = fixture();
        assert_eq!(TreeWalker::new(temp.path().join("proj/.git")).count(), 0);
    }

    #[test]
    fn test_render_connectors() {
        let temp = fixture();
        let mut renderer = TreeRenderer::new();
        let lines: Vec<_> = TreeWalker::new(temp.path().join("proj"))
            .map(|e| renderer.line(&e.unwrap()))
            .collect();
        assert_eq!(
            lines,
            vec![
                "└── proj",
                "    ├── Cargo.toml",
                "    └── src",
                "        ├── bin",
                "        │   └── main.rs",
                "        └── lib.rs",
            ]
        );
    }

    #[test]
    fn test_walk_continues_after_read_error() {
        let temp = fixture();
        let mut walker = TreeWalker::new(temp.path().join("proj"));
        assert_eq!(walker.next().unwrap().unwrap().name, "proj");

        walker.pending_error = Some(FsError::Io(std::io::Error::other("denied")));
        let rest: Vec<_> = walker
            .map(|e| e.map(|e| e.name).map_err(|e| e.to_string()))
            .collect();
        assert_eq!(
            rest,
            vec![
                Err("IO error: denied".to_string()),
                Ok("Cargo.toml".to_string()),
                Ok("src".to_string()),
                Ok("bin".to_string()),
                Ok("main.rs".to_string()),
                Ok("lib.rs".to_string()),
            ]
        );
    }

    #[test]
    fn test_deep_nesting() {
        let temp = TempDir::new().unwrap();
        let mut path = temp.path().join("d");
        for _ in 0..200 {
            path.push("n");
        }
        std::fs::create_dir_all(&path).unwrap();

        let walker = TreeWalker::new(temp.path().join("d"));
        let max_depth = walker.map(|e| e.unwrap().depth).max().unwrap();
        assert_eq!(max_depth, 200);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_not_entered() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("root");
        std::fs::create_dir_all(root.join("real/inner")).unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("link")).unwrap();

        let names: Vec<_> = TreeWalker::new(&root)
            .map(|e| e.unwrap().name)
            .collect();
        assert_eq!(names, ["root", "link", "real", "inner"]);
    }
}
