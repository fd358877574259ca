//! Built-in command handlers

use super::{Command, CommandError, Handler, HelpRow, Output, SessionState};
use crate::fs::{self, EntryKind};

pub(super) fn handler(command: Command) -> Handler {
    match command {
        Command::Ls => ls,
        Command::Cd => cd,
        Command::Pwd => pwd,
        Command::Mkdir => mkdir,
        Command::Touch => touch,
        Command::Cat => cat,
        Command::Clear => clear,
        Command::Help => help,
        Command::History => history,
        Command::Tree => tree,
        Command::Exit => exit,
    }
}

fn first(args: &[String]) -> Option<&str> {
    args.first().map(String::as_str)
}

fn ls(state: &mut SessionState, args: &[String]) -> Result<Output, CommandError> {
    Ok(Output::Listing(fs::list(&state.sandbox, first(args))?))
}

fn cd(state: &mut SessionState, args: &[String]) -> Result<Output, CommandError> {
    fs::change_directory(&mut state.sandbox, first(args))?;
    Ok(Output::None)
}

fn pwd(state: &mut SessionState, _args: &[String]) -> Result<Output, CommandError> {
    Ok(Output::Text(
        state.sandbox.relative_current().display().to_string(),
    ))
}

fn mkdir(state: &mut SessionState, args: &[String]) -> Result<Output, CommandError> {
    let name = fs::make_directory(&state.sandbox, first(args))?;
    Ok(Output::Created {
        kind: EntryKind::Directory,
        name,
    })
}

fn touch(state: &mut SessionState, args: &[String]) -> Result<Output, CommandError> {
    let name = fs::create_file(&state.sandbox, first(args))?;
    Ok(Output::Created {
        kind: EntryKind::File,
        name,
    })
}

fn cat(state: &mut SessionState, args: &[String]) -> Result<Output, CommandError> {
    Ok(Output::File(fs::read_file(&state.sandbox, first(args))?))
}

fn clear(_state: &mut SessionState, _args: &[String]) -> Result<Output, CommandError> {
    Ok(Output::Clear)
}

fn help(_state: &mut SessionState, _args: &[String]) -> Result<Output, CommandError> {
    let rows = Command::ALL
        .into_iter()
        .map(|cmd| HelpRow {
            name: cmd.name(),
            description: cmd.description(),
            aliases: cmd.aliases(),
        })
        .collect();
    Ok(Output::Help(rows))
}

fn history(state: &mut SessionState, _args: &[String]) -> Result<Output, CommandError> {
    let lines = state
        .history
        .numbered()
        .map(|(n, line)| (n, line.to_string()))
        .collect();
    Ok(Output::History(lines))
}

fn tree(state: &mut SessionState, args: &[String]) -> Result<Output, CommandError> {
    Ok(Output::Tree(fs::tree(&state.sandbox, first(args))?))
}

fn exit(state: &mut SessionState, _args: &[String]) -> Result<Output, CommandError> {
    state.running = false;
    Ok(Output::None)
}
