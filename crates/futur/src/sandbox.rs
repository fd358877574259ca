//! Sandbox state: the confinement root and the current directory.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::path::{self, PathError};

/// Errors raised while establishing the sandbox root.
///
/// These are the only fatal errors in a session.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The root directory could not be created
    #[error("failed to create sandbox root {}: {source}", .path.display())]
    CreateRoot {
        /// Requested root
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// The root directory could not be canonicalized
    #[error("failed to resolve sandbox root {}: {source}", .path.display())]
    ResolveRoot {
        /// Requested root
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// The root exists but is not a directory
    #[error("sandbox root is not a directory: {}", .0.display())]
    RootNotADirectory(PathBuf),
}

/// Confinement root and current directory for one shell session.
///
/// The current directory only changes through [`Sandbox::set_current_path`],
/// which re-checks confinement before committing.
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
    current: PathBuf,
}

impl Sandbox {
    /// Create the root directory if needed and open a sandbox on it.
    ///
    /// Creating the root is idempotent. The stored root is canonical.
    pub fn initialize(root: impl AsRef<Path>) -> Result<Self, SandboxError> {
        let requested = root.as_ref();

        if !requested.exists() {
            tracing::debug!(root = %requested.display(), "creating sandbox root");
        }
        std::fs::create_dir_all(requested).map_err(|source| SandboxError::CreateRoot {
            path: requested.to_path_buf(),
            source,
        })?;

        let root =
            std::fs::canonicalize(requested).map_err(|source| SandboxError::ResolveRoot {
                path: requested.to_path_buf(),
                source,
            })?;
        if !root.is_dir() {
            return Err(SandboxError::RootNotADirectory(root));
        }

        tracing::info!(root = %root.display(), "sandbox initialized");
        Ok(Self {
            current: root.clone(),
            root,
        })
    }

    /// The canonical sandbox root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The current directory
    pub fn current_path(&self) -> &Path {
        &self.current
    }

    /// Current directory relative to the root, `.` at the root.
    pub fn relative_current(&self) -> PathBuf {
        match self.current.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => PathBuf::from("."),
            Ok(rel) => rel.to_path_buf(),
            Err(_) => PathBuf::from("."),
        }
    }

    /// Short label for the prompt: `~` at the root, else the directory name.
    pub fn prompt_label(&self) -> String {
        if self.current == self.root {
            return "~".to_string();
        }
        self.current
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "~".to_string())
    }

    /// Resolve a user-supplied path against the current directory.
    pub fn sanitize(&self, raw: &str) -> Result<PathBuf, PathError> {
        path::resolve(raw, &self.current, &self.root).inspect_err(|e| {
            if let PathError::OutsideSandbox { path } = e {
                tracing::warn!(input = raw, resolved = %path.display(), "rejected path outside sandbox");
            }
        })
    }

    /// Move the current directory to `path`.
    ///
    /// The path is canonicalized and checked against the root again, so a
    /// value that did not come from [`Sandbox::sanitize`] cannot escape.
    pub fn set_current_path(&mut self, path: impl AsRef<Path>) -> Result<(), PathError> {
        let path = path.as_ref();
        let canonical = std::fs::canonicalize(path)
            .map_err(|e| PathError::InvalidPath(format!("{}: {}", path.display(), e)))?;
        if !path::is_within(&canonical, &self.root) {
            tracing::warn!(path = %canonical.display(), "refused to leave sandbox");
            return Err(PathError::OutsideSandbox { path: canonical });
        }
        self.current = canonical;
        Ok(())
    }

    /// Delete the root and everything below it.
    pub fn cleanup(self) -> std::io::Result<()> {
        if self.root.exists() {
            tracing::info!(root = %self.root.display(), "removing sandbox root");
            std::fs::remove_dir_all(&self.root)?;
        }
        Ok(())
    }
}
