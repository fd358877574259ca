//! Futur: sandboxed filesystem shell
//!
//! A small line-oriented shell (`ls`, `cd`, `mkdir`, `touch`, `cat`, `tree`,
//! ...) whose every path argument is resolved against a single workspace
//! directory and rejected if it would land outside it.

pub mod config;
pub mod dispatcher;
pub mod fs;
pub mod path;
mod presenter;
mod sandbox;
mod session;

pub use config::{ConfigError, SessionConfig};
pub use dispatcher::{Command, CommandError, CommandHistory, Dispatcher, Output};
pub use fs::FsError;
pub use path::PathError;
pub use presenter::{Presenter, TextPresenter};
pub use sandbox::{Sandbox, SandboxError};
pub use session::{Flow, MENU_SENTINEL, Session};
