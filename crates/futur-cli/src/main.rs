//! Futur CLI - interactive sandboxed filesystem shell
//!
//! Usage:
//!   futur                         Interactive session in ./workspace
//!   futur --root DIR              Interactive session in DIR
//!   futur -c "mkdir src" -c tree  Run lines and exit

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use futur::{Flow, Session, SessionConfig, TextPresenter};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Futur - a shell confined to a single workspace directory
#[derive(Parser, Debug)]
#[command(name = "futur")]
#[command(about = "Sandboxed filesystem shell")]
struct Args {
    /// Sandbox root directory (created if missing)
    #[arg(long)]
    root: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run this line instead of reading input; may be repeated
    #[arg(short = 'c', long = "command")]
    commands: Vec<String>,

    /// Delete the sandbox root when the session ends
    #[arg(long)]
    cleanup: bool,
}

fn main() -> ExitCode {
    // Logs go to stderr so they don't interleave with command output
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("futur: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> anyhow::Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    };
    if let Some(root) = &args.root {
        config.root = root.clone();
    }
    if args.cleanup {
        config.cleanup_on_exit = true;
    }
    Ok(config)
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    let presenter = TextPresenter::new(io::stdout());
    let mut session = Session::from_config(&config, presenter)
        .context("failed to initialize sandbox")?;

    if args.commands.is_empty() {
        install_interrupt_hint();
        let flow = session.run(io::stdin().lock())?;
        tracing::debug!(?flow, "session ended");
    } else {
        for line in &args.commands {
            if session.execute(line)? != Flow::Continue {
                break;
            }
        }
    }

    let (sandbox, _) = session.into_parts();
    if config.cleanup_on_exit {
        sandbox
            .cleanup()
            .context("failed to remove sandbox root")?;
    }
    Ok(())
}

/// Ctrl-C prints a reminder instead of ending the session.
fn install_interrupt_hint() {
    let result = ctrlc::set_handler(|| {
        let mut stdout = io::stdout();
        let _ = writeln!(
            stdout,
            "\nUse 'exit' to quit or 'menu' to return to main menu"
        );
        let _ = stdout.flush();
    });
    if let Err(e) = result {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
    }
}
