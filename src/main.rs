mod cli;
mod commands;
mod engine;
mod logging;
mod paths;
mod progress;
mod prompt;
mod report;
mod runner;
mod ui;

use anyhow::Result;
use batch::SelectError;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use logging::LogOptions;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit code after the user dismissed a prompt
const EXIT_ABORTED: u8 = 130;

/// Global context for the application
pub struct Context {
    pub quiet: bool,
    /// `-c/--config` override
    pub config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    LogOptions::from_cli(&cli).init();

    let ctx = Context {
        quiet: cli.quiet,
        config: cli.config.clone(),
    };

    match dispatch(&ctx, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if is_aborted(&err) => {
            log::debug!("Aborted by user");
            ExitCode::from(EXIT_ABORTED)
        }
        Err(err) => {
            ui::error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

fn dispatch(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Config(cmd) => commands::config::run(ctx, cmd),
        Command::Plugins(cmd) => commands::plugins::run(ctx, cmd),
        Command::Reports(cmd) => commands::reports::run(ctx, cmd),
        Command::Vaults(cmd) => commands::vaults::run(ctx, cmd),
        Command::Completions { shell } => {
            generate(shell, &mut Cli::command(), "ovm", &mut io::stdout());
            Ok(())
        }
    }
}

/// Whether the error chain ends in a dismissed prompt
fn is_aborted(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| matches!(cause.downcast_ref::<SelectError>(), Some(SelectError::Aborted)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context as _;

    #[test]
    fn test_is_aborted_through_context() {
        let err = anyhow::Error::new(SelectError::Aborted).context("Select vaults");
        assert!(is_aborted(&err));

        let wrapped: Result<()> = Err(SelectError::Aborted).context("outer");
        assert!(is_aborted(&wrapped.unwrap_err()));
    }

    #[test]
    fn test_other_errors_are_not_aborts() {
        assert!(!is_aborted(&anyhow::anyhow!("boom")));
        assert!(!is_aborted(&anyhow::Error::new(SelectError::Empty)));
    }
}
