//! Info command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, ConfigOverrides, InfoArgs, RunPaths};
use crate::train::prepare_data;
use crate::Result;

pub fn run_info(args: InfoArgs, level: LogLevel) -> Result<()> {
    let config = load_config(&args.config, &ConfigOverrides::default())?;

    log(level, LogLevel::Normal, "Configuration Info:");
    println!();
    println!("Database: {} ({})", config.database, config.data_index.display());
    println!(
        "Model: {} ({:?} aggregation, hidden_dim={})",
        config.model, config.aggregation, config.hidden_dim
    );
    println!("Learning rate: {} (weight decay {})", config.learning_rate, config.weight_decay);
    println!("Epochs: {}", config.n_epochs);
    println!("Batch size: {}", config.batch_size);
    println!("Split: train_ratio={}, test_ratio={}", config.train_ratio, config.test_ratio);

    let paths = RunPaths::new(&config.output_dir, &config.database, &config.model, args.exp_id);
    println!("Snapshot: {}", paths.snapshot().display());
    println!("Report: {}", paths.report().display());

    if config.data_index.exists() {
        let (database, splits) = prepare_data(&config, args.exp_id)?;
        println!(
            "Images: {} ({} train, {} val, {} test), {} features per patch",
            database.samples.len(),
            splits.train.len(),
            splits.val.len(),
            splits.test.len(),
            database.feature_dim
        );
    } else {
        log(
            level,
            LogLevel::Verbose,
            &format!("  database index {} not found", config.data_index.display()),
        );
    }
    Ok(())
}
