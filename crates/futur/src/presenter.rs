//! Rendering of command output.
//!
//! The dispatcher only produces structured [`Output`] values; a [`Presenter`]
//! decides how they look. [`TextPresenter`] writes plain text to any
//! [`io::Write`], which is what the CLI and the tests use.

use std::io::{self, Write};

use crossterm::{cursor::MoveTo, queue, terminal::Clear, terminal::ClearType};

use crate::dispatcher::{CommandError, HelpRow, Output};
use crate::fs::{EntryKind, FsError, Listing, TreeRenderer, TreeWalker, format_size};

/// Output sink for a shell session
pub trait Presenter {
    /// Greeting shown when an interactive loop starts
    fn banner(&mut self) -> io::Result<()>;

    /// Show the input prompt
    fn prompt(&mut self, name: &str, label: &str) -> io::Result<()>;

    /// Render the result of a successful command
    fn render(&mut self, output: Output) -> io::Result<()>;

    /// Report a failed command
    fn error(&mut self, error: &CommandError) -> io::Result<()>;
}

/// Plain-text presenter
#[derive(Debug)]
pub struct TextPresenter<W> {
    out: W,
}

impl<W: Write> TextPresenter<W> {
    /// Write to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Borrow the underlying writer
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn listing(&mut self, listing: &Listing) -> io::Result<()> {
        let width = listing
            .entries
            .iter()
            .map(|e| e.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Name".len());

        writeln!(self.out, "{:<5} {:<width$}  Size", "Type", "Name")?;
        for entry in &listing.entries {
            let kind = match entry.kind {
                EntryKind::Parent | EntryKind::Directory => "dir",
                EntryKind::File => "file",
            };
            let size = entry.size.map(format_size).unwrap_or_default();
            writeln!(self.out, "{:<5} {:<width$}  {}", kind, entry.name, size)?;
        }
        Ok(())
    }

    fn tree(&mut self, walker: TreeWalker) -> io::Result<()> {
        let mut renderer = TreeRenderer::new();
        for entry in walker {
            match entry {
                Ok(entry) => writeln!(self.out, "{}", renderer.line(&entry))?,
                Err(e) => self.error(&CommandError::Fs(e))?,
            }
        }
        Ok(())
    }

    fn help(&mut self, rows: &[HelpRow]) -> io::Result<()> {
        writeln!(self.out, "Available Commands")?;
        for row in rows {
            let aliases = row.aliases.join(", ");
            writeln!(
                self.out,
                "  {:<9} {:<28} {}",
                row.name, row.description, aliases
            )?;
        }
        Ok(())
    }

    fn history(&mut self, lines: &[(usize, String)]) -> io::Result<()> {
        let Some((last, _)) = lines.last() else {
            return writeln!(self.out, "No command history");
        };
        writeln!(self.out, "Command History")?;
        let width = last.to_string().len();
        for (n, line) in lines {
            writeln!(self.out, "  {:>width$}  {}", n, line)?;
        }
        Ok(())
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn banner(&mut self) -> io::Result<()> {
        writeln!(self.out, "Terminal Mode")?;
        writeln!(
            self.out,
            "Safe sandbox environment - Type 'help' for commands"
        )?;
        writeln!(self.out, "Type 'menu' to return to main menu")?;
        self.out.flush()
    }

    fn prompt(&mut self, name: &str, label: &str) -> io::Result<()> {
        write!(self.out, "{}:{}$ ", name, label)?;
        self.out.flush()
    }

    fn render(&mut self, output: Output) -> io::Result<()> {
        match output {
            Output::None => {}
            Output::Text(text) => writeln!(self.out, "{}", text)?,
            Output::Created { kind, name } => {
                let what = match kind {
                    EntryKind::File => "file",
                    EntryKind::Directory | EntryKind::Parent => "directory",
                };
                writeln!(self.out, "Created {}: {}", what, name)?;
            }
            Output::Listing(listing) => self.listing(&listing)?,
            Output::File(file) => {
                writeln!(self.out, "── {} ──", file.name)?;
                self.out.write_all(file.text.as_bytes())?;
                if !file.text.is_empty() && !file.text.ends_with('\n') {
                    writeln!(self.out)?;
                }
            }
            Output::Tree(walker) => self.tree(walker)?,
            Output::Help(rows) => self.help(&rows)?,
            Output::History(lines) => self.history(&lines)?,
            Output::Clear => queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?,
        }
        self.out.flush()
    }

    fn error(&mut self, error: &CommandError) -> io::Result<()> {
        match error {
            CommandError::UnknownCommand { name, suggestions } => {
                writeln!(self.out, "Unknown command: {}", name)?;
                if !suggestions.is_empty() {
                    writeln!(self.out, "Did you mean: {}?", suggestions.join(", "))?;
                }
                writeln!(self.out, "Type 'help' for available commands")?;
            }
            CommandError::Fs(FsError::MissingArgument(what)) => {
                let mut what = what.to_string();
                if let Some(first) = what.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                writeln!(self.out, "Error: {} name required", what)?;
            }
            CommandError::Fs(e) => writeln!(self.out, "Error: {}", e)?,
            CommandError::Parse(reason) => writeln!(self.out, "Error: {}", reason)?,
        }
        self.out.flush()
    }
}
