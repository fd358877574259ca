//! Command history

/// Append-only record of input lines, in the order they were entered.
///
/// Lines are stored exactly as typed, including ones that failed or named
/// unknown commands. There is no deduplication and no size cap.
#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
    entries: Vec<String>,
}

impl CommandHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a line
    pub fn push(&mut self, line: impl Into<String>) {
        self.entries.push(line.into());
    }

    /// All recorded lines, oldest first
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Lines paired with their 1-based position
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, line)| (i + 1, line.as_str()))
    }

    /// Number of recorded lines
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
