//! Console entry point for the todo tracker.
//!
//! # Responsibility
//! - Resolve configuration from flags and environment.
//! - Bootstrap logging and load the task file.
//! - Hand control to the interactive shell.
//!
//! Exit status: `0` on normal exit or closed input, `1` when the task file
//! cannot be loaded at startup or the terminal fails.

mod shell;

use clap::Parser;
use log::{error, info};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use todo_core::{init_logging, LogConfig, TaskService, TodoConfig, DEFAULT_DATA_FILE};

use crate::shell::ConsoleShell;

#[derive(Debug, Parser)]
#[command(name = "todo")]
#[command(version)]
#[command(about = "A small local task tracker with fuzzy search")]
struct Cli {
    #[arg(
        short = 'f',
        long,
        env = "TODO_FILE",
        default_value = DEFAULT_DATA_FILE,
        help = "Path to the JSON task file."
    )]
    file: PathBuf,

    #[arg(
        long,
        env = "TODO_LOG_LEVEL",
        default_value = "warn",
        help = "Log level: trace|debug|info|warn|error|off."
    )]
    log_level: String,

    #[arg(
        long,
        env = "TODO_LOG_DIR",
        help = "Absolute directory for rotating log files. Logs go to stderr when unset."
    )]
    log_dir: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> TodoConfig {
        TodoConfig {
            data_file: self.file,
            log: LogConfig {
                level: self.log_level,
                dir: self.log_dir,
            },
        }
    }
}

fn main() -> ExitCode {
    let config = Cli::parse().into_config();

    // Logging is optional; a bad log setup must not block task access.
    if let Err(err) = init_logging(&config.log) {
        eprintln!("warning: logging disabled: {err}");
    }

    let mut service = match TaskService::new(config.open_repository()) {
        Ok(service) => service,
        Err(err) => {
            error!("event=startup module=cli status=error error={err}");
            eprintln!("error: {err}");
            return ExitCode::from(1);
        }
    };
    info!(
        "event=startup module=cli status=ok count={}",
        service.len()
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let result = ConsoleShell::new(&mut service, stdin.lock(), stdout.lock()).run();
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=shell module=cli status=error error={err}");
            eprintln!("error: terminal failure: {err}");
            ExitCode::from(1)
        }
    }
}
