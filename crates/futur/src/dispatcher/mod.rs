//! Command dispatch.
//!
//! A raw input line is split with shell quoting rules, the first token is
//! lower-cased and passed through the alias table, and the resulting
//! [`Command`] tag selects a handler from a registry built once at startup.

mod commands;
mod history;

pub use history::CommandHistory;

use std::collections::HashMap;

use thiserror::Error;

use crate::fs::{EntryKind, FileContents, FsError, Listing, TreeWalker};
use crate::sandbox::Sandbox;

/// Every command the shell understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// List directory contents
    Ls,
    /// Change directory
    Cd,
    /// Print the current directory relative to the root
    Pwd,
    /// Create a directory
    Mkdir,
    /// Create an empty file
    Touch,
    /// Print a file
    Cat,
    /// Clear the display
    Clear,
    /// List commands
    Help,
    /// List previous input lines
    History,
    /// Print a directory tree
    Tree,
    /// End the session
    Exit,
}

/// Alias name and the command it stands for
pub const ALIASES: [(&str, Command); 4] = [
    ("dir", Command::Ls),
    ("cls", Command::Clear),
    ("quit", Command::Exit),
    ("?", Command::Help),
];

impl Command {
    /// All commands, in help order
    pub const ALL: [Command; 11] = [
        Command::Ls,
        Command::Cd,
        Command::Pwd,
        Command::Mkdir,
        Command::Touch,
        Command::Cat,
        Command::Clear,
        Command::Help,
        Command::History,
        Command::Tree,
        Command::Exit,
    ];

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            Command::Ls => "ls",
            Command::Cd => "cd",
            Command::Pwd => "pwd",
            Command::Mkdir => "mkdir",
            Command::Touch => "touch",
            Command::Cat => "cat",
            Command::Clear => "clear",
            Command::Help => "help",
            Command::History => "history",
            Command::Tree => "tree",
            Command::Exit => "exit",
        }
    }

    /// One-line description for `help`
    pub fn description(self) -> &'static str {
        match self {
            Command::Ls => "List directory contents",
            Command::Cd => "Change directory",
            Command::Pwd => "Print working directory",
            Command::Mkdir => "Create a new directory",
            Command::Touch => "Create an empty file",
            Command::Cat => "Display file contents",
            Command::Clear => "Clear the terminal screen",
            Command::Help => "Show this help message",
            Command::History => "Show command history",
            Command::Tree => "Display directory structure",
            Command::Exit => "Exit the terminal",
        }
    }

    /// Aliases that resolve to this command
    pub fn aliases(self) -> Vec<&'static str> {
        ALIASES
            .iter()
            .filter(|(_, cmd)| *cmd == self)
            .map(|(alias, _)| *alias)
            .collect()
    }

    /// Look up a command by canonical name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.name() == name)
    }
}

/// A row of the `help` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpRow {
    /// Canonical command name
    pub name: &'static str,
    /// Description
    pub description: &'static str,
    /// Aliases for the command
    pub aliases: Vec<&'static str>,
}

/// Structured result of a command, rendered by a
/// [`Presenter`](crate::Presenter)
#[derive(Debug)]
pub enum Output {
    /// Nothing to show
    None,
    /// A single line of text
    Text(String),
    /// A file or directory was created
    Created {
        /// What was created
        kind: EntryKind,
        /// Its name
        name: String,
    },
    /// Directory listing
    Listing(Listing),
    /// File contents
    File(FileContents),
    /// Lazy directory tree
    Tree(TreeWalker),
    /// Help table
    Help(Vec<HelpRow>),
    /// History lines with their 1-based position, oldest first
    History(Vec<(usize, String)>),
    /// Clear the display
    Clear,
}

/// Errors reported by the dispatcher. None of them end the session.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A filesystem operation failed
    #[error(transparent)]
    Fs(#[from] FsError),
    /// The line could not be split into words
    #[error("{0}")]
    Parse(String),
    /// No command or alias matched
    #[error("unknown command: {name}")]
    UnknownCommand {
        /// The lower-cased command word
        name: String,
        /// Commands and aliases that start with `name`
        suggestions: Vec<&'static str>,
    },
}

/// Mutable per-session state that handlers operate on
#[derive(Debug)]
pub struct SessionState {
    /// Confinement root and current directory
    pub sandbox: Sandbox,
    /// Recorded input lines
    pub history: CommandHistory,
    /// Cleared by `exit`
    pub running: bool,
}

impl SessionState {
    /// Fresh state around an initialized sandbox
    pub fn new(sandbox: Sandbox) -> Self {
        Self {
            sandbox,
            history: CommandHistory::new(),
            running: true,
        }
    }
}

/// Handler invoked with the positional arguments of a command
pub type Handler = fn(&mut SessionState, &[String]) -> Result<Output, CommandError>;

/// Command registry and alias table
pub struct Dispatcher {
    registry: HashMap<Command, Handler>,
    aliases: HashMap<&'static str, Command>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("commands", &self.registry.len())
            .field("aliases", &self.aliases)
            .finish()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Build the registry with every built-in command
    pub fn new() -> Self {
        let registry = Command::ALL
            .into_iter()
            .map(|cmd| (cmd, commands::handler(cmd)))
            .collect();
        let aliases = ALIASES.into_iter().collect();
        Self { registry, aliases }
    }

    /// Resolve a command word, applying aliases. Matching ignores case.
    pub fn resolve(&self, word: &str) -> Option<Command> {
        let word = word.to_lowercase();
        match self.aliases.get(word.as_str()) {
            Some(cmd) => Some(*cmd),
            None => Command::from_name(&word),
        }
    }

    /// Split `line` and run the matching handler.
    ///
    /// An empty line produces [`Output::None`].
    pub fn dispatch(&self, state: &mut SessionState, line: &str) -> Result<Output, CommandError> {
        let words = shell_words::split(line).map_err(|e| CommandError::Parse(e.to_string()))?;
        let Some((word, args)) = words.split_first() else {
            return Ok(Output::None);
        };

        let command = self.resolve(word);
        let handler = command.and_then(|cmd| self.registry.get(&cmd));
        let (Some(command), Some(handler)) = (command, handler) else {
            let name = word.to_lowercase();
            return Err(CommandError::UnknownCommand {
                suggestions: self.completions(&name),
                name,
            });
        };

        tracing::debug!(command = command.name(), ?args, "dispatching");
        handler(state, args)
    }

    /// Commands and aliases starting with `prefix`; all of them when empty.
    pub fn completions(&self, prefix: &str) -> Vec<&'static str> {
        Command::ALL
            .iter()
            .map(|cmd| cmd.name())
            .chain(ALIASES.iter().map(|(alias, _)| *alias))
            .filter(|name| name.starts_with(prefix))
            .collect()
    }
}
