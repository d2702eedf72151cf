//! iqa-train CLI
//!
//! # Usage
//!
//! ```bash
//! # Train experiment 0 with the database and model named in the config
//! iqa-train train config.yaml
//!
//! # Train on another database and model for experiment 3
//! iqa-train train config.yaml --exp-id 3 --database TID2013 --model WaDIQaM-FR
//!
//! # Evaluate a saved model on the test split
//! iqa-train evaluate config.yaml --checkpoint models/WaDIQaM-NR-LIVE-EXP0.full
//!
//! # Validate config and database
//! iqa-train validate config.yaml --data
//! ```

use iqa_train::cli::{run_command, LogLevel};
use iqa_train::config::parse_args;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = parse_args();

    let level = LogLevel::from_flags(cli.verbose, cli.quiet);
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level.filter().to_string()),
    )
    .format_target(false)
    .init();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
