//! Evaluate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, EvaluateArgs, SplitName};
use crate::train::evaluate_checkpoint;
use crate::Result;

pub fn run_evaluate(args: EvaluateArgs, level: LogLevel) -> Result<()> {
    let config = load_config(&args.config, &args.overrides())?;
    log(
        level,
        LogLevel::Verbose,
        &format!("Evaluating {} on {}", args.checkpoint.display(), config.database),
    );

    let evaluation = evaluate_checkpoint(&config, args.exp_id, &args.checkpoint, args.split)?;
    let label = match args.split {
        SplitName::Val => "val",
        SplitName::Test => "test",
    };
    log(level, LogLevel::Normal, &evaluation.measures.summary(label, evaluation.loss));
    log(level, LogLevel::Verbose, &format!("  {} images", evaluation.q.len()));
    Ok(())
}
