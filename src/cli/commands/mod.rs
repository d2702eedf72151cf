//! CLI command implementations

mod evaluate;
mod info;
mod train;
mod validate;

use crate::cli::LogLevel;
use crate::config::{Cli, Command};
use crate::Result;

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<()> {
    let log_level = LogLevel::from_flags(cli.verbose, cli.quiet);

    match cli.command {
        Command::Train(args) => train::run_train(args, log_level),
        Command::Evaluate(args) => evaluate::run_evaluate(args, log_level),
        Command::Validate(args) => validate::run_validate(args, log_level),
        Command::Info(args) => info::run_info(args, log_level),
    }
}
