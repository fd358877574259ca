//! Interactive session: dispatcher, state and presenter bundled together.
//!
//! A [`Session`] is the context object passed down to everything that needs
//! the sandbox or the output sink; there is no global console.

use std::io::{self, BufRead};

use crate::config::SessionConfig;
use crate::dispatcher::{CommandHistory, Dispatcher, SessionState};
use crate::presenter::Presenter;
use crate::sandbox::{Sandbox, SandboxError};

/// Line that returns control to the enclosing menu. Checked before dispatch.
pub const MENU_SENTINEL: &str = "menu";

/// What the caller should do after a line has been handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading input
    Continue,
    /// Return to the enclosing context
    Menu,
    /// End the session
    Exit,
}

/// One shell session
#[derive(Debug)]
pub struct Session<P> {
    state: SessionState,
    dispatcher: Dispatcher,
    presenter: P,
    prompt_name: String,
}

impl<P: Presenter> Session<P> {
    /// Create a session on an initialized sandbox
    pub fn new(sandbox: Sandbox, presenter: P) -> Self {
        Self {
            state: SessionState::new(sandbox),
            dispatcher: Dispatcher::new(),
            presenter,
            prompt_name: SessionConfig::default().prompt_name,
        }
    }

    /// Initialize the sandbox named by `config` and open a session on it
    pub fn from_config(config: &SessionConfig, presenter: P) -> Result<Self, SandboxError> {
        let sandbox = Sandbox::initialize(&config.root)?;
        Ok(Self::new(sandbox, presenter).with_prompt_name(config.prompt_name.clone()))
    }

    /// Set the name shown in the prompt
    pub fn with_prompt_name(mut self, name: impl Into<String>) -> Self {
        self.prompt_name = name.into();
        self
    }

    /// Handle one input line.
    ///
    /// Blank lines and the menu sentinel are not recorded. Everything else is
    /// appended to history before dispatch, whether or not it succeeds.
    /// Command failures go to the presenter; only output errors are returned.
    pub fn execute(&mut self, line: &str) -> io::Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }
        if line == MENU_SENTINEL {
            return Ok(Flow::Menu);
        }

        self.state.history.push(line);

        match self.dispatcher.dispatch(&mut self.state, line) {
            Ok(output) => self.presenter.render(output)?,
            Err(e) => {
                tracing::debug!(error = %e, line, "command failed");
                self.presenter.error(&e)?;
            }
        }

        Ok(if self.state.running {
            Flow::Continue
        } else {
            Flow::Exit
        })
    }

    /// Read and handle lines until `exit`, `menu`, or end of input.
    pub fn run(&mut self, mut input: impl BufRead) -> io::Result<Flow> {
        self.presenter.banner()?;

        let mut line = String::new();
        loop {
            let label = self.state.sandbox.prompt_label();
            self.presenter.prompt(&self.prompt_name, &label)?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                return Ok(Flow::Exit);
            }

            match self.execute(&line)? {
                Flow::Continue => {}
                flow => return Ok(flow),
            }
        }
    }

    /// Whether `exit` has not been issued yet
    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// The session's sandbox
    pub fn sandbox(&self) -> &Sandbox {
        &self.state.sandbox
    }

    /// Lines entered so far
    pub fn history(&self) -> &CommandHistory {
        &self.state.history
    }

    /// The output sink
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// End the session, returning the sandbox and presenter
    pub fn into_parts(self) -> (Sandbox, P) {
        (self.state.sandbox, self.presenter)
    }
}
