//! Directory listing

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use super::FsError;

/// Kind of a listed entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Parent directory marker (`..`)
    Parent,
    /// Directory
    Directory,
    /// Anything that is not a directory
    File,
}

/// A single row of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// Entry name
    pub name: String,
    /// Entry kind
    pub kind: EntryKind,
    /// Size in bytes, for files only
    pub size: Option<u64>,
}

/// An ordered directory listing.
///
/// `..` comes first when the listed directory is not the sandbox root, then
/// directories, then files, each group sorted by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Directory that was listed
    pub path: PathBuf,
    /// Entries in display order
    pub entries: Vec<ListEntry>,
}

impl Listing {
    pub(crate) fn read(dir: &Path, show_parent: bool) -> Result<Self, FsError> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            // Follow symlinks for the kind; a dangling link lists as a file.
            let (kind, size) = match std::fs::metadata(entry.path()) {
                Ok(meta) if meta.is_dir() => (EntryKind::Directory, None),
                Ok(meta) => (EntryKind::File, Some(meta.len())),
                Err(_) => (
                    EntryKind::File,
                    Some(entry.metadata().map(|m| m.len()).unwrap_or(0)),
                ),
            };
            entries.push(ListEntry { name, kind, size });
        }
        entries.sort_by(compare_entries);

        if show_parent {
            entries.insert(
                0,
                ListEntry {
                    name: "..".to_string(),
                    kind: EntryKind::Parent,
                    size: None,
                },
            );
        }

        Ok(Self {
            path: dir.to_path_buf(),
            entries,
        })
    }
}

fn compare_entries(a: &ListEntry, b: &ListEntry) -> Ordering {
    let rank = |e: &ListEntry| match e.kind {
        EntryKind::Parent => 0,
        EntryKind::Directory => 1,
        EntryKind::File => 2,
    };
    rank(a).cmp(&rank(b)).then_with(|| a.name.cmp(&b.name))
}

/// Format a byte count for display.
///
/// Sizes below 1024 print as `"{n} bytes"` with thousands grouping; larger
/// sizes are scaled by 1024 with one decimal place.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} bytes", group_thousands(bytes));
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
