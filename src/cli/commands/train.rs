//! Train command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, TrainArgs};
use crate::train::run_experiment;
use crate::Result;

pub fn run_train(args: TrainArgs, level: LogLevel) -> Result<()> {
    log(
        level,
        LogLevel::Normal,
        &format!("iqa-train: training from {}", args.config.display()),
    );

    let config = load_config(&args.config, &args.overrides())?;
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  {} on {} (EXP {}), {} epochs, lr={}",
            config.model, config.database, args.exp_id, config.n_epochs, config.learning_rate
        ),
    );

    let outcome = run_experiment(&config, args.exp_id)?;

    match &outcome.best {
        Some(best) => log(
            level,
            LogLevel::Normal,
            &format!("Best model from epoch {} (val loss={:.4})", best.epoch, best.val.loss),
        ),
        None => log(level, LogLevel::Normal, "No best model was selected"),
    }
    if let Some(test) = &outcome.test {
        log(level, LogLevel::Normal, &test.measures.summary("test", test.loss));
    }
    log(
        level,
        LogLevel::Normal,
        &format!("Training complete in {:.1}s", outcome.elapsed_secs),
    );
    Ok(())
}
